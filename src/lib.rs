pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notify;
pub mod probes;
pub mod reporting;
pub mod session;
pub mod target;
pub mod utils;

// Re-export main types for easier access
pub use config::Config;
pub use engine::{DispatchSettings, Dispatcher, Ledger, Outcome, Probe, ProbeSet, RunResult};
pub use error::{OsintError, OsintResult, ProbeError};
pub use notify::{CommandNotifier, LogNotifier, Notifier};
pub use reporting::{JsonSink, ResultSink};
pub use session::{RunReport, Session};
pub use target::{Target, TargetKind, Validator};
