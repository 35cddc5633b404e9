use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::DispatchSettings;
use crate::target::TargetKind;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    pub email: KindConfig,
    pub ip: KindConfig,
    pub username: KindConfig,
    pub services: ServiceConfig,
    #[serde(default)]
    pub credentials: CredentialConfig,
    pub ports: PortConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub user_agent: String,
    pub browser_user_agent: String,
    pub http_timeout_secs: u64,
    pub output_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub notifications: bool,
    pub notify_command: String,
}

/// Worker pool, deadline and output folder for one target kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindConfig {
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
}

/// Base URLs of the external services probed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub haveibeenpwned: String,
    pub emailrep: String,
    pub clearbit: String,
    pub ipinfo: String,
    pub asn: String,
    pub abuseipdb: String,
}

/// Optional API keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haveibeenpwned_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearbit_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abuseipdb_key: Option<String>,
}

/// TCP ports checked by the IP trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    pub tcp: Vec<u16>,
    pub connect_timeout_ms: u64,
}

impl KindConfig {
    fn new(concurrency: usize, timeout_secs: u64, output_dir: &str) -> Self {
        Self {
            concurrency,
            timeout_secs,
            output_dir: PathBuf::from(output_dir),
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings::new(self.concurrency, Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Settings for one target kind
    pub fn kind(&self, kind: TargetKind) -> &KindConfig {
        match kind {
            TargetKind::Email => &self.email,
            TargetKind::Ip => &self.ip,
            TargetKind::Username => &self.username,
        }
    }

    pub fn kind_mut(&mut self, kind: TargetKind) -> &mut KindConfig {
        match kind {
            TargetKind::Email => &mut self.email,
            TargetKind::Ip => &mut self.ip,
            TargetKind::Username => &mut self.username,
        }
    }

    /// Default output directory for a kind, under the output root
    pub fn output_dir(&self, kind: TargetKind) -> PathBuf {
        self.global.output_root.join(&self.kind(kind).output_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: GlobalConfig {
                user_agent: "probehound".to_string(),
                browser_user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
                http_timeout_secs: 5,
                output_root: PathBuf::from("."),
                log_file: None,
                notifications: true,
                notify_command: "notify-send".to_string(),
            },
            email: KindConfig::new(4, 10, TargetKind::Email.default_output_dir()),
            ip: KindConfig::new(5, 15, TargetKind::Ip.default_output_dir()),
            username: KindConfig::new(20, 10, TargetKind::Username.default_output_dir()),
            services: ServiceConfig {
                haveibeenpwned: "https://haveibeenpwned.com/api/v3/breachedaccount".to_string(),
                emailrep: "https://emailrep.io".to_string(),
                clearbit: "https://clearbit.com/api/v1/people/email".to_string(),
                ipinfo: "https://ipinfo.io".to_string(),
                asn: "https://asn.cymru.com/cgi-bin/whois.cgi".to_string(),
                abuseipdb: "https://api.abuseipdb.com/api/v2/check".to_string(),
            },
            credentials: CredentialConfig::default(),
            ports: PortConfig {
                tcp: vec![21, 22, 23, 25, 53, 80, 110, 143, 443, 3306, 5432, 8080],
                connect_timeout_ms: 1000,
            },
        }
    }
}
