//! Turns SIGCHLD, SIGUSR1 and SIGUSR2 into engine notifications.
//!
//! The signals are blocked and collected synchronously with `sigwait` on a
//! dedicated thread, so no code runs in async-signal context and the process
//! table is only ever written by the engine.

use std::io;
use std::os::unix::thread::JoinHandleExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::errno::Errno;
use nix::sys::pthread::pthread_kill;
use nix::sys::signal::{SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid as NixPid;
use tracing::{debug, trace, warn};

use scheduler::{Notification, NotificationSender, Pid};

/// The signals the listener owns.
pub fn watched_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    set.add(Signal::SIGUSR1);
    set.add(Signal::SIGUSR2);
    set
}

/// Background thread feeding a [`NotificationSender`].
///
/// * SIGCHLD: every child that changed state is reaped and reported as
///   [`Notification::ChildExited`] or [`Notification::ChildStopped`].
/// * SIGUSR1: [`Notification::IoStarted`].
/// * SIGUSR2: [`Notification::IoCompleted`].
///
/// The thread stops when the listener is dropped.
pub struct SignalListener {
    handle: Option<JoinHandle<()>>,
    done: Arc<AtomicBool>,
}

impl SignalListener {
    /// Blocks the watched signals and starts the listener thread.
    ///
    /// Call this from the main thread before any other thread is spawned,
    /// so that every thread inherits the mask and the signals can only be
    /// consumed here.
    pub fn install(sender: NotificationSender) -> io::Result<SignalListener> {
        let signals = watched_signals();
        signals.thread_block()?;

        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        let handle = thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || listen(signals, sender, flag))?;

        Ok(SignalListener {
            handle: Some(handle),
            done,
        })
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            // Wake the sigwait; the thread may already be gone.
            let _ = pthread_kill(handle.as_pthread_t(), Signal::SIGCHLD);
            if handle.join().is_err() {
                warn!("signal listener panicked");
            }
        }
    }
}

fn listen(signals: SigSet, sender: NotificationSender, done: Arc<AtomicBool>) {
    debug!("signal listener started");
    loop {
        let signal = match signals.wait() {
            Ok(signal) => signal,
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!("sigwait failed: {errno}");
                break;
            }
        };
        trace!("received {}", signal.as_str());

        let delivered = match signal {
            Signal::SIGCHLD => reap(&sender),
            Signal::SIGUSR1 => sender.send(Notification::IoStarted),
            Signal::SIGUSR2 => sender.send(Notification::IoCompleted),
            _ => true,
        };

        if !delivered || done.load(Ordering::Acquire) {
            break;
        }
    }
    debug!("signal listener finished");
}

/// Collects every pending child status. Returns `false` once the engine no
/// longer listens.
fn reap(sender: &NotificationSender) -> bool {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED;
    loop {
        let notification = match waitpid(None::<NixPid>, Some(flags)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!("pid {pid} exited with {code}");
                Pid::from_raw(pid.as_raw()).map(Notification::ChildExited)
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                debug!("pid {pid} killed by {}", signal.as_str());
                Pid::from_raw(pid.as_raw()).map(Notification::ChildExited)
            }
            Ok(WaitStatus::Stopped(pid, signal)) => {
                trace!("pid {pid} stopped by {}", signal.as_str());
                Pid::from_raw(pid.as_raw()).map(Notification::ChildStopped)
            }
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return true,
            Ok(_) | Err(Errno::EINTR) => None,
            Err(errno) => {
                warn!("waitpid failed: {errno}");
                return true;
            }
        };

        if let Some(notification) = notification {
            if !sender.send(notification) {
                return false;
            }
        }
    }
}
