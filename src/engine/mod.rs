mod outcome;
mod parallel;
mod probe;

pub use outcome::{FailureKind, Ledger, LedgerEntry, Outcome, RunResult};
pub use parallel::{run, DispatchSettings, Dispatcher};
pub use probe::{probe_fn, single_field, Fields, FnProbe, Probe, ProbeSet};
