use std::time::Duration;

use tracing::{debug, trace};

use crate::engine::{dispatch, drain, preempt, ready_after_io, wait_and_deliver};
use crate::error::SchedulerError;
use crate::notification::Notifications;
use crate::table::ProcessTable;
use crate::{launch, Policy, ProcessControl, ProcessState, RunStats, Scheduler};

/// Round-Robin over the table in arrival order.
///
/// A freshly launched record is preempted right away, so its first quantum
/// comes on the next pass like everyone else's.
#[derive(Debug)]
pub struct RoundRobin {
    quantum: Duration,
}

impl RoundRobin {
    pub fn new(quantum: Duration) -> Self {
        RoundRobin { quantum }
    }

    /// One visit of the record at `arrival`. Returns whether anything moved.
    fn visit(
        &self,
        arrival: usize,
        table: &mut ProcessTable,
        control: &mut dyn ProcessControl,
        notifications: &Notifications,
    ) -> Result<bool, SchedulerError> {
        let Some(record) = table.get_mut(arrival) else {
            return Ok(false);
        };

        match record.state() {
            ProcessState::Exited => Ok(false),
            ProcessState::New => {
                launch(record, control)?;
                preempt(record, control)?;
                Ok(true)
            }
            ProcessState::Running => {
                preempt(record, control)?;
                Ok(true)
            }
            ProcessState::WaitingForIo => Ok(ready_after_io(record)),
            ProcessState::Stopped | ProcessState::Ready => {
                dispatch(record, control)?;
                control.sleep(self.quantum);
                drain(table, control, notifications);

                if let Some(record) = table.get_mut(arrival) {
                    if record.state() == ProcessState::Running {
                        preempt(record, control)?;
                    } else {
                        debug!("{} left the CPU as {}", record.name(), record.state());
                    }
                }
                Ok(true)
            }
        }
    }

    /// Applies what arrived during the pass, then blocks for the next event
    /// if nothing moved and nothing can.
    fn finish_pass(
        &self,
        pass: usize,
        mut progressed: bool,
        table: &mut ProcessTable,
        control: &mut dyn ProcessControl,
        notifications: &Notifications,
    ) -> Result<(), SchedulerError> {
        progressed |= drain(table, control, notifications) > 0;
        trace!("pass {pass} done, progressed: {progressed}");

        // Everyone left is waiting for I/O: sleep on the next event.
        if !progressed && !table.all_exited() {
            wait_and_deliver(table, control, notifications)?;
        }
        Ok(())
    }
}

impl Scheduler for RoundRobin {
    fn policy(&self) -> Policy {
        Policy::RoundRobin {
            quantum: self.quantum,
        }
    }

    fn run(
        &mut self,
        table: &mut ProcessTable,
        control: &mut dyn ProcessControl,
        notifications: &Notifications,
    ) -> Result<RunStats, SchedulerError> {
        let started = control.now();
        let mut passes = 0;

        while !table.all_exited() {
            passes += 1;
            let mut progressed = false;

            for arrival in 0..table.len() {
                progressed |= drain(table, control, notifications) > 0;
                progressed |= self.visit(arrival, table, control, notifications)?;
            }
            self.finish_pass(passes, progressed, table, control, notifications)?;
        }

        Ok(RunStats {
            passes,
            launched: table.iter().filter(|record| record.handle().is_some()).count(),
            elapsed: control.now().saturating_duration_since(started),
        })
    }
}
