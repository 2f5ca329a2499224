//! A process scheduler library.
//!
//! This library drives real child processes through a simulated single-CPU
//! scheduling policy, First-Come-First-Served or Round-Robin, and accounts
//! for the wall time and CPU work of each one.
//!
//! The engine never touches the operating system directly: it goes through
//! [`ProcessControl`], and learns about exits and I/O waits from a
//! [`notification`] channel that it drains between its own steps.
//!

mod scheduler;

pub mod engine;
pub mod error;
pub mod notification;
pub mod schedulers;
pub mod timing;

mod launcher;
mod record;
mod table;

#[cfg(test)]
mod testing;

pub use crate::error::{ControlError, SchedulerError};
pub use crate::launcher::launch;
pub use crate::notification::{Notification, NotificationSender, Notifications};
pub use crate::record::ProcessRecord;
pub use crate::scheduler::{
    Pid, Policy, ProcessControl, ProcessState, RunStats, Scheduler,
};
pub use crate::table::ProcessTable;
pub use crate::timing::Timing;
