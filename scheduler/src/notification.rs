//! Asynchronous events from the machine to the engine.
//!
//! The producer side ([`NotificationSender`]) lives wherever OS events are
//! observed, usually a signal thread. The engine owns the receiving side and
//! applies events with [`deliver`] between its own steps, so the process
//! table has a single writer.

use std::fmt::{self, Display};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Instant;

use tracing::debug;

use crate::error::SchedulerError;
use crate::table::ProcessTable;
use crate::{Pid, ProcessState};

/// An event observed outside the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The process terminated.
    ChildExited(Pid),

    /// The OS reports the process as stopped.
    ChildStopped(Pid),

    /// The running process started waiting for I/O.
    IoStarted,

    /// The earliest process waiting for I/O has finished it.
    IoCompleted,
}

impl Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ChildExited(pid) => write!(f, "EXITED {pid}"),
            Notification::ChildStopped(pid) => write!(f, "STOPPED {pid}"),
            Notification::IoStarted => write!(f, "IO STARTED"),
            Notification::IoCompleted => write!(f, "IO COMPLETED"),
        }
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (NotificationSender, Notifications) {
    let (tx, rx) = mpsc::channel();
    (NotificationSender { tx }, Notifications { rx })
}

/// Producer half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: Sender<Notification>,
}

impl NotificationSender {
    /// Returns `false` once the engine side is gone.
    pub fn send(&self, notification: Notification) -> bool {
        self.tx.send(notification).is_ok()
    }
}

/// Consumer half, owned by the engine.
#[derive(Debug)]
pub struct Notifications {
    rx: Receiver<Notification>,
}

impl Notifications {
    /// The next pending notification, without blocking.
    pub fn try_recv(&self) -> Option<Notification> {
        match self.rx.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks for the next notification.
    pub fn recv(&self) -> Result<Notification, SchedulerError> {
        self.rx.recv().map_err(|_| SchedulerError::ChannelClosed)
    }
}

/// What [`deliver`] did with a notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The record at `arrival` is now in `state`.
    Applied { arrival: usize, state: ProcessState },

    /// No record matched, or the match was already past this event.
    Ignored,
}

/// Applies `notification` to `table` at time `now`.
///
/// Each kind only touches the records it can legally move: exits apply to
/// launched, unfinished records; I/O start to the running record; I/O
/// completion to the earliest unflagged waiting record. Repeating an exit is
/// a no-op.
pub fn deliver(table: &mut ProcessTable, notification: Notification, now: Instant) -> Delivery {
    let delivery = match notification {
        Notification::ChildExited(pid) => match table.find_by_handle_mut(pid) {
            Some(record) => {
                record.timing.on_exit(now);
                record.transition(ProcessState::Exited);
                Delivery::Applied {
                    arrival: record.arrival(),
                    state: record.state(),
                }
            }
            None => Delivery::Ignored,
        },
        Notification::ChildStopped(_) => Delivery::Ignored,
        Notification::IoStarted => match table.first_mut(ProcessState::Running, |_| true) {
            Some(record) => {
                record.timing.on_pause(now);
                record.set_io_completed(false);
                record.transition(ProcessState::WaitingForIo);
                Delivery::Applied {
                    arrival: record.arrival(),
                    state: record.state(),
                }
            }
            None => Delivery::Ignored,
        },
        Notification::IoCompleted => {
            match table.first_mut(ProcessState::WaitingForIo, |record| !record.io_completed()) {
                Some(record) => {
                    record.set_io_completed(true);
                    Delivery::Applied {
                        arrival: record.arrival(),
                        state: record.state(),
                    }
                }
                None => Delivery::Ignored,
            }
        }
    };
    debug!("{notification} -> {delivery:?}");
    delivery
}
