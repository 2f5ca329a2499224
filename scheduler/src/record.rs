use tracing::warn;

use crate::timing::Timing;
use crate::{Pid, ProcessState};

/// The scheduler's bookkeeping for one task (the PCB).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    name: String,
    entry_time: i64,
    arrival: usize,
    handle: Option<Pid>,
    state: ProcessState,
    io_completed: bool,
    pub(crate) timing: Timing,
}

impl ProcessRecord {
    pub fn new(name: impl Into<String>, entry_time: i64, arrival: usize) -> Self {
        ProcessRecord {
            name: name.into(),
            entry_time,
            arrival,
            handle: None,
            state: ProcessState::New,
            io_completed: false,
            timing: Timing::default(),
        }
    }

    /// The program to execute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared entry time. Carried along, never used for ordering.
    pub fn entry_time(&self) -> i64 {
        self.entry_time
    }

    /// Position in the input.
    pub fn arrival(&self) -> usize {
        self.arrival
    }

    /// The PID, once launched.
    pub fn handle(&self) -> Option<Pid> {
        self.handle
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn is_exited(&self) -> bool {
        self.state == ProcessState::Exited
    }

    /// Whether an IoCompleted notification was matched to this record.
    pub fn io_completed(&self) -> bool {
        self.io_completed
    }

    pub(crate) fn set_io_completed(&mut self, completed: bool) {
        self.io_completed = completed;
    }

    /// Records the PID. Only the first call has an effect.
    pub(crate) fn set_handle(&mut self, pid: Pid) -> bool {
        if self.handle.is_some() {
            return false;
        }
        self.handle = Some(pid);
        true
    }

    /// Moves to `next` if the state machine allows it.
    pub fn transition(&mut self, next: ProcessState) -> bool {
        if !self.state.can_transition_to(next) {
            if self.state != next {
                warn!(
                    "{} ({:?}): refusing transition {} -> {}",
                    self.name, self.handle, self.state, next
                );
            }
            return false;
        }
        self.state = next;
        true
    }
}
