use tracing::info;

use crate::error::SchedulerError;
use crate::record::ProcessRecord;
use crate::{Pid, ProcessControl, ProcessState};

/// Starts the program behind `record` and makes it the running record.
///
/// Any spawn failure is fatal for the run: nothing already launched is
/// rolled back.
pub fn launch(record: &mut ProcessRecord, control: &mut dyn ProcessControl) -> Result<Pid, SchedulerError> {
    if let Some(pid) = record.handle() {
        return Err(SchedulerError::AlreadyLaunched {
            program: record.name().to_string(),
            pid,
        });
    }

    let pid = control
        .spawn(record.name())
        .map_err(|source| SchedulerError::Launch {
            program: record.name().to_string(),
            source,
        })?;

    record.set_handle(pid);
    record.timing.on_launch(control.now());
    record.transition(ProcessState::Running);
    info!("launched {} as pid {}", record.name(), pid);
    Ok(pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification;
    use crate::testing::{FakeControl, Step};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn launch_sets_handle_state_and_start_time() {
        let (tx, _rx) = notification::channel();
        let mut control = FakeControl::new(tx).program("./work", &[Step::Work(Duration::from_millis(5))]);
        let mut record = ProcessRecord::new("./work", 0, 0);

        let pid = launch(&mut record, &mut control).unwrap();

        assert_eq!(record.handle(), Some(pid));
        assert_eq!(record.state(), ProcessState::Running);
        assert_eq!(record.timing().started_at(), Some(control.now()));
        assert!(record.timing().is_on_cpu());
    }

    #[test]
    fn second_launch_is_refused() {
        let (tx, _rx) = notification::channel();
        let mut control = FakeControl::new(tx).program("./work", &[Step::Work(Duration::from_millis(5))]);
        let mut record = ProcessRecord::new("./work", 0, 0);

        let pid = launch(&mut record, &mut control).unwrap();
        let err = launch(&mut record, &mut control).unwrap_err();

        assert!(matches!(err, SchedulerError::AlreadyLaunched { pid: p, .. } if p == pid));
        assert_eq!(control.journal(), vec!["launch ./work"]);
    }

    #[test]
    fn spawn_failure_leaves_record_new() {
        let (tx, _rx) = notification::channel();
        let mut control = FakeControl::new(tx);
        let mut record = ProcessRecord::new("./missing", 0, 0);

        let err = launch(&mut record, &mut control).unwrap_err();

        assert!(matches!(err, SchedulerError::Launch { ref program, .. } if program == "./missing"));
        assert_eq!(record.state(), ProcessState::New);
        assert_eq!(record.handle(), None);
    }
}
