use std::fmt::{self, Display};
use std::io;
use std::num::NonZeroU32;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{ControlError, SchedulerError};
use crate::notification::{Notification, Notifications};
use crate::table::ProcessTable;

/// The PID of a launched process
///
/// The PID cannot be 0, the OS never hands out 0 to a child.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Pid(NonZeroU32);

impl Pid {
    /// Returns `None` for 0.
    pub fn new(pid: u32) -> Option<Pid> {
        NonZeroU32::new(pid).map(Pid)
    }

    /// Returns `None` for 0 and negative values (process groups).
    pub fn from_raw(pid: i32) -> Option<Pid> {
        u32::try_from(pid).ok().and_then(Pid::new)
    }

    pub fn as_raw(self) -> i32 {
        // PIDs are bounded by pid_max, far below i32::MAX
        self.0.get() as i32
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state of a process record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// The record has not been launched yet.
    New,

    /// The process finished its I/O wait and is ready to be resumed.
    Ready,

    /// The process is the one holding the simulated CPU.
    Running,

    /// The process has been preempted.
    Stopped,

    /// The process announced an I/O wait that has not completed yet.
    WaitingForIo,

    /// The process has terminated. This state is final.
    Exited,
}

impl ProcessState {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, next),
            (New, Running)
                | (Running, Stopped | WaitingForIo | Exited)
                | (Stopped, Running | Exited)
                | (WaitingForIo, Ready | Exited)
                | (Ready, Running | Exited)
        )
    }
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::New => write!(f, "NEW"),
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Stopped => write!(f, "STOPPED"),
            ProcessState::WaitingForIo => write!(f, "IO WAIT"),
            ProcessState::Exited => write!(f, "EXITED"),
        }
    }
}

/// The scheduling policy selected for a run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Policy {
    /// First-Come-First-Served.
    Fcfs,
    /// Round-Robin with a fixed quantum.
    RoundRobin { quantum: Duration },
}

impl Policy {
    /// Builds a Round-Robin policy from a quantum in milliseconds.
    ///
    /// Zero and negative quanta are accepted and clamped to a zero duration,
    /// which makes the policy degenerate into a tight loop.
    pub fn round_robin_millis(quantum_ms: i64) -> Policy {
        let quantum = u64::try_from(quantum_ms)
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO);
        Policy::RoundRobin { quantum }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "FCFS"),
            Policy::RoundRobin { quantum } => write!(f, "RR ({}ms)", quantum.as_millis()),
        }
    }
}

/// Totals reported by a finished run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Number of traversals over the process table.
    pub passes: usize,

    /// Number of records that were launched.
    pub launched: usize,

    /// Wall time spent inside the engine.
    pub elapsed: Duration,
}

/// The operations the engine needs from the machine it drives.
///
/// The real implementation talks to the operating system; tests use a
/// virtual-time double.
pub trait ProcessControl {
    /// Start `program` with no arguments and return its PID.
    fn spawn(&mut self, program: &str) -> io::Result<Pid>;

    /// Pause the process (SIGSTOP).
    fn suspend(&mut self, pid: Pid) -> Result<(), ControlError>;

    /// Continue the process (SIGCONT).
    fn resume(&mut self, pid: Pid) -> Result<(), ControlError>;

    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Give the CPU to the running process for `duration`.
    ///
    /// Notifications arriving meanwhile do not cut the sleep short.
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Block until the next notification is available.
    fn wait_event(&mut self, notifications: &Notifications) -> Result<Notification, SchedulerError> {
        notifications.recv()
    }
}

/// The trait that any scheduling policy has to implement.
pub trait Scheduler {
    /// The policy this scheduler implements.
    fn policy(&self) -> Policy;

    /// Drive every record of `table` to [`ProcessState::Exited`].
    fn run(
        &mut self,
        table: &mut ProcessTable,
        control: &mut dyn ProcessControl,
        notifications: &Notifications,
    ) -> Result<RunStats, SchedulerError>;
}
