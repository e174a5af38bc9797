//! Deadlines - the cooperative-yield signal handed to each scheduler tick.
//!
//! The scheduler checks `time_remaining()` after every unit of work and
//! yields once it drops below the configured threshold.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time left before control must go back to the host.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// Wall-clock deadline: `budget` from creation.
#[derive(Debug, Clone, Copy)]
pub struct FrameDeadline {
    end: Instant,
}

impl FrameDeadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }
}

impl Deadline for FrameDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Deterministic deadline allowing a fixed number of work units.
///
/// Each `time_remaining` call consumes one unit; once they run out it reports
/// zero. Use a fresh one per tick.
#[derive(Debug)]
pub struct UnitDeadline {
    remaining: Cell<usize>,
}

impl UnitDeadline {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl Deadline for UnitDeadline {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 { Duration::ZERO } else { Duration::MAX }
    }
}

/// Never yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}
