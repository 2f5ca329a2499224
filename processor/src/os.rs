use std::io;
use std::process::Command;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;
use tracing::trace;

use scheduler::{ControlError, Pid, ProcessControl};

/// [`ProcessControl`] backed by real child processes.
///
/// Children are never waited on here: reaping belongs to the
/// [`crate::SignalListener`], which reports exits as notifications.
#[derive(Debug, Default)]
pub struct OsProcessor {
    spawned: usize,
}

impl OsProcessor {
    pub fn new() -> Self {
        OsProcessor::default()
    }

    /// Number of children started so far.
    pub fn spawned(&self) -> usize {
        self.spawned
    }
}

impl ProcessControl for OsProcessor {
    fn spawn(&mut self, program: &str) -> io::Result<Pid> {
        let child = Command::new(program).spawn()?;
        let pid = Pid::new(child.id())
            .ok_or_else(|| io::Error::other(format!("{program} was given pid 0")))?;
        self.spawned += 1;
        Ok(pid)
    }

    fn suspend(&mut self, pid: Pid) -> Result<(), ControlError> {
        send(pid, Signal::SIGSTOP)
    }

    fn resume(&mut self, pid: Pid) -> Result<(), ControlError> {
        send(pid, Signal::SIGCONT)
    }
}

fn send(pid: Pid, signal: Signal) -> Result<(), ControlError> {
    trace!("{} -> {}", signal.as_str(), pid);
    match kill(NixPid::from_raw(pid.as_raw()), signal) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(ControlError::Gone(pid)),
        Err(errno) => Err(ControlError::Signal {
            pid,
            signal: signal.as_str(),
            source: errno.into(),
        }),
    }
}
