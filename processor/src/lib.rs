//! The operating-system side of the scheduler.
//!
//! [`OsProcessor`] starts, stops and continues real child processes for the
//! engine in the [`scheduler`] crate, [`SignalListener`] reports what those
//! children do, and [`format_report`] prints the outcome of a run.

mod os;
mod report;
mod signals;

pub use os::OsProcessor;
pub use report::{format_report, RecordSummary};
pub use signals::{watched_signals, SignalListener};
