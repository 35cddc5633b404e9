// src/main.rs
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info};

use probehound::config::Config;
use probehound::engine::Outcome;
use probehound::notify::{CommandNotifier, LogNotifier, Notifier};
use probehound::probes::{self, platforms::PLATFORMS, ProbeContext};
use probehound::session::{RunReport, Session};
use probehound::target::TargetKind;
use probehound::{logging, OsintError};

#[derive(Parser)]
#[command(name = "probehound")]
#[command(about = "Concurrent OSINT probes against an email, IP address or username")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Cli,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Also write logs to this file")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Cli {
    /// Breach, reputation and MX checks for an email address
    Email {
        #[arg(help = "Email address")]
        address: String,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Geolocation, ASN, abuse, reverse DNS and port checks for an IP address
    Trace {
        #[arg(help = "IPv4 or IPv6 address")]
        ip: String,

        #[command(flatten)]
        run: RunOptions,
    },

    /// Look for a username across known platforms
    Username {
        #[arg(help = "Username to search for")]
        name: String,

        #[command(flatten)]
        run: RunOptions,
    },

    /// List the platforms checked by the username search
    Platforms {
        #[arg(long, help = "Filter by category")]
        category: Option<String>,
    },

    /// Initialize config
    Init {
        #[arg(short, long, help = "Force overwrite existing configuration")]
        force: bool,
    },
}

#[derive(ClapArgs)]
struct RunOptions {
    #[arg(short, long, help = "Output directory")]
    output: Option<PathBuf>,

    #[arg(long, help = "Maximum concurrent probes")]
    concurrency: Option<usize>,

    #[arg(long, help = "Per-probe timeout in seconds")]
    timeout: Option<u64>,

    #[arg(long, help = "Skip the completion notification")]
    no_notify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init runs before any configuration exists
    if let Cli::Init { force } = &args.command {
        logging::init(args.verbose, args.log_file.as_deref())?;
        let path = Config::init(*force)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            exit(2);
        }
    };

    let log_file = args.log_file.clone().or_else(|| config.global.log_file.clone());
    logging::init(args.verbose, log_file.as_deref())?;
    info!("probehound {} starting", env!("CARGO_PKG_VERSION"));

    let (kind, raw, run) = match args.command {
        Cli::Email { address, run } => (TargetKind::Email, address, run),
        Cli::Trace { ip, run } => (TargetKind::Ip, ip, run),
        Cli::Username { name, run } => (TargetKind::Username, name, run),
        Cli::Platforms { category } => {
            list_platforms(category.as_deref());
            return Ok(());
        }
        Cli::Init { .. } => unreachable!("handled above"),
    };

    match run_kind(config, kind, &raw, run).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            let fatal = e.downcast_ref::<OsintError>().map_or(false, OsintError::is_fatal);
            exit(if fatal { 2 } else { 1 });
        }
    }
}

async fn run_kind(config: Config, kind: TargetKind, raw: &str, run: RunOptions) -> Result<RunReport> {
    let mut settings = config.kind(kind).dispatch_settings();
    if let Some(concurrency) = run.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(secs) = run.timeout {
        settings.timeout = Duration::from_secs(secs);
    }

    let default_output = config.output_dir(kind);
    let notifier: Arc<dyn Notifier> = if config.global.notifications {
        Arc::new(CommandNotifier::new(config.global.notify_command.clone()))
    } else {
        Arc::new(LogNotifier)
    };

    let ctx = ProbeContext::new(Arc::new(config)).context("Failed to prepare probes")?;
    let probes = probes::probe_set(kind, &ctx)?;
    info!("Dispatching {} {} probes", probes.len(), kind);

    let mut session = Session::new(probes, settings)
        .with_notifier(notifier)
        .with_default_output(default_output)
        .target(raw);

    if let Some(output) = run.output {
        session = session.output(output);
    }

    let mut session = session.execute().await?;
    if !run.no_notify {
        session = session.notify();
    }

    session
        .finish()
        .await
        .context("Session finished without a report")
}

fn print_report(report: &RunReport) {
    let Some(target) = &report.target else {
        println!("No valid {} target given; nothing was run.", report.kind);
        return;
    };

    println!("Run {} on {}", report.run_id, target);
    for (name, entry) in report.ledger.in_completion_order() {
        let detail = match &entry.outcome {
            Outcome::Success(fields) => format!("{} field(s)", fields.len()),
            Outcome::Failure { kind, message } => format!("{:?}: {}", kind, message),
            Outcome::Timeout => String::new(),
        };
        println!(
            "  {:<24} {:<8} {:>8.2}s  {}",
            name,
            entry.outcome.label(),
            entry.elapsed.as_secs_f64(),
            detail
        );
    }

    println!(
        "{} succeeded, {} failed, {} timed out",
        report.ledger.succeeded(),
        report.ledger.failed(),
        report.ledger.timed_out()
    );

    match (&report.artifact, &report.persistence_error) {
        (Some(path), _) => println!("Results saved to {}", path.display()),
        (None, Some(message)) => println!("Results not saved: {}", message),
        (None, None) => println!("No results to save"),
    }
}

fn list_platforms(category: Option<&str>) {
    let filtered = PLATFORMS
        .iter()
        .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c)));

    for platform in filtered {
        println!("{:<20} {:<28} {}", platform.name, platform.category, platform.template);
    }
}
