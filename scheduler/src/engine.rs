//! The control loop plumbing shared by every policy.

use tracing::{debug, info, warn};

use crate::error::{ControlError, SchedulerError};
use crate::notification::{deliver, Delivery, Notifications};
use crate::record::ProcessRecord;
use crate::schedulers::{Fcfs, RoundRobin};
use crate::table::ProcessTable;
use crate::{Policy, ProcessControl, ProcessState, RunStats, Scheduler};

/// Returns the scheduler implementing `policy`.
pub fn scheduler_for(policy: Policy) -> Box<dyn Scheduler> {
    match policy {
        Policy::Fcfs => Box::new(Fcfs::new()),
        Policy::RoundRobin { quantum } => Box::new(RoundRobin::new(quantum)),
    }
}

/// Runs `table` to completion under `policy`.
pub fn run(
    policy: Policy,
    table: &mut ProcessTable,
    control: &mut dyn ProcessControl,
    notifications: &Notifications,
) -> Result<RunStats, SchedulerError> {
    if let Policy::RoundRobin { quantum } = policy {
        if quantum.is_zero() {
            warn!("zero quantum, round robin degenerates into a tight loop");
        }
    }
    info!("scheduling {} processes with {}", table.len(), policy);

    let stats = scheduler_for(policy).run(table, control, notifications)?;

    info!(
        "all {} processes exited after {} passes in {:.2}s",
        table.len(),
        stats.passes,
        stats.elapsed.as_secs_f64()
    );
    Ok(stats)
}

/// Applies every pending notification. Returns how many changed a record.
pub(crate) fn drain(
    table: &mut ProcessTable,
    control: &dyn ProcessControl,
    notifications: &Notifications,
) -> usize {
    let mut applied = 0;
    while let Some(notification) = notifications.try_recv() {
        if let Delivery::Applied { .. } = deliver(table, notification, control.now()) {
            applied += 1;
        }
    }
    applied
}

/// Blocks for one notification and applies it.
pub(crate) fn wait_and_deliver(
    table: &mut ProcessTable,
    control: &mut dyn ProcessControl,
    notifications: &Notifications,
) -> Result<Delivery, SchedulerError> {
    let notification = control.wait_event(notifications)?;
    Ok(deliver(table, notification, control.now()))
}

/// Takes the CPU away from a running record.
///
/// A child that is already gone is not an error: its exit notification is
/// queued or about to be.
pub(crate) fn preempt(record: &mut ProcessRecord, control: &mut dyn ProcessControl) -> Result<(), SchedulerError> {
    let Some(pid) = record.handle() else {
        return Ok(());
    };
    match control.suspend(pid) {
        Ok(()) => {}
        Err(ControlError::Gone(_)) => debug!("{} ({pid}) gone before preemption", record.name()),
        Err(e) => return Err(e.into()),
    }
    record.timing.on_pause(control.now());
    record.transition(ProcessState::Stopped);
    debug!("{} ({pid}) -> {}", record.name(), record.state());
    Ok(())
}

/// Hands the CPU to a stopped or ready record.
pub(crate) fn dispatch(record: &mut ProcessRecord, control: &mut dyn ProcessControl) -> Result<(), SchedulerError> {
    let Some(pid) = record.handle() else {
        return Ok(());
    };
    match control.resume(pid) {
        Ok(()) => {}
        Err(ControlError::Gone(_)) => debug!("{} ({pid}) gone before resuming", record.name()),
        Err(e) => return Err(e.into()),
    }
    record.timing.on_resume(control.now());
    record.transition(ProcessState::Running);
    debug!("{} ({pid}) -> {}", record.name(), record.state());
    Ok(())
}

/// Moves a waiting record whose I/O completed to ready.
pub(crate) fn ready_after_io(record: &mut ProcessRecord) -> bool {
    if record.state() != ProcessState::WaitingForIo || !record.io_completed() {
        return false;
    }
    record.set_io_completed(false);
    record.transition(ProcessState::Ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification;
    use crate::testing::{FakeControl, Step};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn every_record_exits_under_both_policies() {
        for policy in [Policy::Fcfs, Policy::round_robin_millis(40)] {
            let (tx, rx) = notification::channel();
            let mut control = FakeControl::new(tx)
                .program("./a", &[Step::Work(ms(90))])
                .program("./b", &[Step::Work(ms(10)), Step::Io(ms(30)), Step::Work(ms(60))])
                .program("./c", &[]);
            let mut table: ProcessTable = [("./a", 0), ("./b", 0), ("./c", 0)].into_iter().collect();

            let stats = run(policy, &mut table, &mut control, &rx).unwrap();

            assert!(table.all_exited(), "{policy}");
            assert_eq!(stats.launched, 3, "{policy}");
            for record in &table {
                let timing = record.timing();
                assert!(timing.cpu_work() <= timing.elapsed_wall(control.now()), "{policy}");
            }
        }
    }

    #[test]
    fn scheduler_for_matches_policy() {
        let rr = Policy::round_robin_millis(25);
        assert_eq!(scheduler_for(Policy::Fcfs).policy(), Policy::Fcfs);
        assert_eq!(scheduler_for(rr).policy(), rr);
    }

    #[test]
    fn negative_quantum_is_clamped_to_zero() {
        assert_eq!(
            Policy::round_robin_millis(-5),
            Policy::RoundRobin {
                quantum: Duration::ZERO
            }
        );
    }

    #[test]
    fn preempting_a_gone_child_still_stops_the_record() {
        let (tx, rx) = notification::channel();
        let mut control = FakeControl::new(tx).program("./quick", &[]);
        let mut table: ProcessTable = [("./quick", 0)].into_iter().collect();
        let record = table.get_mut(0).unwrap();

        crate::launch(record, &mut control).unwrap();
        preempt(record, &mut control).unwrap();
        assert_eq!(record.state(), ProcessState::Stopped);

        assert_eq!(drain(&mut table, &control, &rx), 1);
        assert_eq!(table.get(0).unwrap().state(), ProcessState::Exited);
    }
}
