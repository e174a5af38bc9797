//! Scheduler configuration.

use std::time::Duration;

/// Timing knobs for the scheduler and the run loop.
///
/// ```ignore
/// let config = SchedulerConfig::default()
///     .with_frame_budget(Duration::from_millis(8))
///     .with_max_ticks(Some(1_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Yield once the deadline reports less time than this (default: 1ms).
    pub yield_threshold: Duration,
    /// Time allotted to each tick by the run loop (default: 16ms, ~60fps).
    pub frame_budget: Duration,
    /// Upper bound on ticks for `run_until_idle` (default: unbounded).
    pub max_ticks: Option<usize>,
}

impl SchedulerConfig {
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<usize>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            frame_budget: Duration::from_millis(16),
            max_ticks: None,
        }
    }
}
