//! The scheduling policies.
//!
//! Each policy lives in its own file and implements [`crate::Scheduler`].

mod fcfs;
pub use fcfs::Fcfs;

mod round_robin;
pub use round_robin::RoundRobin;
