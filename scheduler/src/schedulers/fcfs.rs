use tracing::debug;

use crate::engine::{dispatch, drain, ready_after_io, wait_and_deliver};
use crate::error::SchedulerError;
use crate::notification::Notifications;
use crate::table::ProcessTable;
use crate::{launch, Policy, ProcessControl, ProcessState, RunStats, Scheduler};

/// First-Come-First-Served.
///
/// Each record runs to completion, in arrival order, before the next one is
/// launched. A record that waits for I/O keeps the CPU reserved: the engine
/// blocks until the I/O completes, resumes it and blocks again.
#[derive(Debug, Default)]
pub struct Fcfs;

impl Fcfs {
    pub fn new() -> Self {
        Fcfs
    }
}

impl Scheduler for Fcfs {
    fn policy(&self) -> Policy {
        Policy::Fcfs
    }

    fn run(
        &mut self,
        table: &mut ProcessTable,
        control: &mut dyn ProcessControl,
        notifications: &Notifications,
    ) -> Result<RunStats, SchedulerError> {
        let started = control.now();
        let mut launched = 0;

        for arrival in 0..table.len() {
            drain(table, control, notifications);

            loop {
                let Some(record) = table.get_mut(arrival) else {
                    break;
                };
                match record.state() {
                    ProcessState::New => {
                        launch(record, control)?;
                        launched += 1;
                    }
                    ProcessState::Exited => break,
                    ProcessState::Ready => dispatch(record, control)?,
                    ProcessState::WaitingForIo if ready_after_io(record) => {
                        debug!("{} finished its I/O", record.name());
                    }
                    ProcessState::Running | ProcessState::Stopped | ProcessState::WaitingForIo => {
                        wait_and_deliver(table, control, notifications)?;
                    }
                }
            }
        }

        Ok(RunStats {
            passes: 1,
            launched,
            elapsed: control.now().saturating_duration_since(started),
        })
    }
}
