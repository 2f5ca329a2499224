//! Wall-clock and CPU-work accounting for a single record.
//!
//! Durations are kept exact internally and converted to floating-point
//! milliseconds on the way out, so `cpu_work <= elapsed_wall` holds without
//! rounding drift.

use std::time::{Duration, Instant};

/// Timing of one record.
///
/// `on_resume` and `on_pause` alternate strictly: a resume while already on
/// the CPU, or a pause while off it, is a no-op and returns `false`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Timing {
    started_at: Option<Instant>,
    last_resumed_at: Option<Instant>,
    exited_at: Option<Instant>,
    cpu_work: Duration,
}

impl Timing {
    /// The process was launched and holds the CPU from `now` on.
    pub fn on_launch(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.last_resumed_at = Some(now);
    }

    pub fn on_resume(&mut self, now: Instant) -> bool {
        if self.started_at.is_none() || self.exited_at.is_some() || self.last_resumed_at.is_some() {
            return false;
        }
        self.last_resumed_at = Some(now);
        true
    }

    pub fn on_pause(&mut self, now: Instant) -> bool {
        match self.last_resumed_at.take() {
            Some(since) => {
                self.cpu_work += now.saturating_duration_since(since);
                true
            }
            None => false,
        }
    }

    /// Freezes the wall time and closes the current CPU interval, if any.
    pub fn on_exit(&mut self, now: Instant) -> bool {
        if self.exited_at.is_some() {
            return false;
        }
        self.on_pause(now);
        self.exited_at = Some(now);
        true
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn exited_at(&self) -> Option<Instant> {
        self.exited_at
    }

    /// Whether a CPU interval is currently open.
    pub fn is_on_cpu(&self) -> bool {
        self.last_resumed_at.is_some()
    }

    /// Wall time since launch, frozen at exit. Zero before launch.
    pub fn elapsed_wall(&self, now: Instant) -> Duration {
        match (self.started_at, self.exited_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// CPU work of closed intervals.
    pub fn cpu_work(&self) -> Duration {
        self.cpu_work
    }

    pub fn elapsed_wall_ms(&self, now: Instant) -> f64 {
        self.elapsed_wall(now).as_secs_f64() * 1000.0
    }

    pub fn cpu_work_ms(&self) -> f64 {
        self.cpu_work.as_secs_f64() * 1000.0
    }
}
