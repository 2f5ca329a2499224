//! A virtual-time machine for driving the engine in tests.
//!
//! Each fake program is a list of steps. `Work` consumes CPU only while the
//! child is not suspended, `Io` announces an I/O wait, lasts its duration
//! regardless of suspension, then leaves the child stopped until resumed.
//! An exhausted step list exits the child.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

use crate::error::{ControlError, SchedulerError};
use crate::notification::{Notification, NotificationSender, Notifications};
use crate::{Pid, ProcessControl};

/// Smallest amount of virtual time a sleep costs, even a zero one.
const MIN_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Step {
    Work(Duration),
    Io(Duration),
}

impl Step {
    fn left(&self) -> Duration {
        match self {
            Step::Work(d) | Step::Io(d) => *d,
        }
    }

    fn consume(&mut self, amount: Duration) {
        match self {
            Step::Work(d) | Step::Io(d) => *d = d.saturating_sub(amount),
        }
    }
}

struct FakeChild {
    pid: Pid,
    name: String,
    steps: VecDeque<Step>,
    stopped: bool,
    in_io: bool,
    exited: bool,
}

impl FakeChild {
    /// Time until this child produces its next event, if it can.
    fn next_event_in(&self) -> Option<Duration> {
        if self.exited {
            return None;
        }
        match self.steps.front() {
            Some(step @ Step::Io(_)) if self.in_io => Some(step.left()),
            Some(step @ Step::Work(_)) if !self.stopped && !self.in_io => Some(step.left()),
            _ => None,
        }
    }
}

pub(crate) struct FakeControl {
    programs: HashMap<String, Vec<Step>>,
    children: Vec<FakeChild>,
    next_pid: u32,
    base: Instant,
    offset: Duration,
    sender: NotificationSender,
    journal: Vec<String>,
}

impl FakeControl {
    pub(crate) fn new(sender: NotificationSender) -> Self {
        FakeControl {
            programs: HashMap::new(),
            children: Vec::new(),
            next_pid: 100,
            base: Instant::now(),
            offset: Duration::ZERO,
            sender,
            journal: Vec::new(),
        }
    }

    pub(crate) fn program(mut self, name: &str, steps: &[Step]) -> Self {
        self.programs.insert(name.to_string(), steps.to_vec());
        self
    }

    /// The launch/suspend/resume requests, in order.
    pub(crate) fn journal(&self) -> Vec<&str> {
        self.journal.iter().map(String::as_str).collect()
    }

    /// Virtual time since the fake was created.
    pub(crate) fn clock(&self) -> Duration {
        self.offset
    }

    pub(crate) fn at(&self, offset: Duration) -> Instant {
        self.base + offset
    }

    fn child(&mut self, pid: Pid) -> Result<&mut FakeChild, ControlError> {
        self.children
            .iter_mut()
            .find(|child| child.pid == pid && !child.exited)
            .ok_or(ControlError::Gone(pid))
    }

    /// Lets a running child act on steps that need no time.
    fn settle(&mut self, index: usize) {
        let child = &mut self.children[index];
        loop {
            if child.exited || child.in_io || child.stopped {
                return;
            }
            match child.steps.front() {
                None => {
                    child.exited = true;
                    self.sender.send(Notification::ChildExited(child.pid));
                    return;
                }
                Some(Step::Work(d)) if d.is_zero() => {
                    child.steps.pop_front();
                }
                Some(Step::Work(_)) => return,
                Some(Step::Io(_)) => {
                    child.in_io = true;
                    self.sender.send(Notification::IoStarted);
                    return;
                }
            }
        }
    }

    fn elapse(&mut self, amount: Duration) {
        for child in self.children.iter_mut() {
            if child.next_event_in().is_some() {
                if let Some(step) = child.steps.front_mut() {
                    step.consume(amount);
                }
            }
        }
        self.offset += amount;
    }

    fn fire(&mut self) {
        for index in 0..self.children.len() {
            if self.children[index].next_event_in() != Some(Duration::ZERO) {
                continue;
            }
            let child = &mut self.children[index];
            child.steps.pop_front();
            if child.in_io {
                child.in_io = false;
                child.stopped = true;
                self.sender.send(Notification::IoCompleted);
            } else {
                self.settle(index);
            }
        }
    }

    fn next_event_in(&self) -> Option<Duration> {
        self.children.iter().filter_map(FakeChild::next_event_in).min()
    }

    fn advance(&mut self, amount: Duration) {
        let mut left = amount;
        loop {
            match self.next_event_in() {
                Some(next) if next <= left => {
                    self.elapse(next);
                    left -= next;
                    self.fire();
                }
                _ => {
                    self.elapse(left);
                    return;
                }
            }
        }
    }
}

impl ProcessControl for FakeControl {
    fn spawn(&mut self, program: &str) -> io::Result<Pid> {
        let steps = self
            .programs
            .get(program)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such program"))?;
        let pid = Pid::new(self.next_pid).expect("fake pids start above zero");
        self.next_pid += 1;
        self.journal.push(format!("launch {program}"));
        self.children.push(FakeChild {
            pid,
            name: program.to_string(),
            steps: steps.into(),
            stopped: false,
            in_io: false,
            exited: false,
        });
        self.settle(self.children.len() - 1);
        Ok(pid)
    }

    fn suspend(&mut self, pid: Pid) -> Result<(), ControlError> {
        let child = self.child(pid)?;
        child.stopped = true;
        let line = format!("suspend {}", child.name);
        self.journal.push(line);
        Ok(())
    }

    fn resume(&mut self, pid: Pid) -> Result<(), ControlError> {
        let child = self.child(pid)?;
        child.stopped = false;
        let line = format!("resume {}", child.name);
        self.journal.push(line);
        if let Some(index) = self.children.iter().position(|child| child.pid == pid) {
            self.settle(index);
        }
        Ok(())
    }

    fn now(&self) -> Instant {
        self.base + self.offset
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration.max(MIN_TICK));
    }

    fn wait_event(&mut self, notifications: &Notifications) -> Result<Notification, SchedulerError> {
        loop {
            if let Some(notification) = notifications.try_recv() {
                return Ok(notification);
            }
            match self.next_event_in() {
                Some(next) => {
                    self.elapse(next);
                    self.fire();
                }
                None => panic!("fake machine would block forever"),
            }
        }
    }
}
