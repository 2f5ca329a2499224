use std::io;

use thiserror::Error;

use crate::Pid;

/// Failure of a suspend/resume request.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The process no longer exists, it exited and was reaped.
    #[error("process {0} is gone")]
    Gone(Pid),

    #[error("failed to send {signal} to process {pid}")]
    Signal {
        pid: Pid,
        signal: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Errors that abort a scheduling run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` was already launched as process {pid}")]
    AlreadyLaunched { program: String, pid: Pid },

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("notification channel closed")]
    ChannelClosed,
}
