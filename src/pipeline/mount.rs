//! Mount API - attach an element tree to a container and drive it.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::pipeline::mount;
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//!
//! let mut handle = mount(host, container, app(), SchedulerConfig::default());
//!
//! // Option 1: settle everything now
//! handle.run_until_idle()?;
//!
//! // Option 2: tick manually in your own loop
//! while handle.tick()?.outcome != TickOutcome::Idle {
//!     // Your logic here
//! }
//! ```

use tracing::debug;

use super::deadline::FrameDeadline;
use crate::config::SchedulerConfig;
use crate::element::Element;
use crate::engine::{CommitReport, Scheduler, TickOutcome, TickReport};
use crate::error::FiberError;
use crate::host::HostBinding;

// =============================================================================
// Mount Handle
// =============================================================================

/// A mounted tree: the scheduler plus the container it renders into.
pub struct MountHandle<H: HostBinding> {
    scheduler: Scheduler<H>,
    container: H::Node,
}

/// What [`MountHandle::run_until_idle`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub ticks: usize,
    pub units: usize,
    pub commits: Vec<CommitReport>,
}

impl<H: HostBinding> MountHandle<H> {
    pub fn container(&self) -> &H::Node {
        &self.container
    }

    pub fn scheduler(&self) -> &Scheduler<H> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<H> {
        &mut self.scheduler
    }

    pub fn host(&self) -> &H {
        self.scheduler.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.scheduler.host_mut()
    }

    /// Replace the mounted tree with `element`.
    pub fn render(&mut self, element: Element) {
        self.scheduler.render(element, self.container.clone());
    }

    /// Run one tick with a fresh frame deadline.
    pub fn tick(&mut self) -> Result<TickReport, FiberError> {
        let deadline = FrameDeadline::new(self.scheduler.config().frame_budget);
        self.scheduler.tick(&deadline)
    }

    /// Tick until no render work or state update is pending.
    ///
    /// Fails with [`FiberError::TickLimit`] once `max_ticks` is exceeded.
    pub fn run_until_idle(&mut self) -> Result<RunReport, FiberError> {
        let mut report = RunReport::default();

        while self.scheduler.has_pending_work() {
            if let Some(limit) = self.scheduler.config().max_ticks {
                if report.ticks >= limit {
                    return Err(FiberError::TickLimit(limit));
                }
            }

            let tick = self.tick()?;
            report.ticks += 1;
            report.units += tick.units;
            if let TickOutcome::Committed(commit) = tick.outcome {
                report.commits.push(commit);
            }
        }

        Ok(report)
    }

    /// Run forever: settle pending work, then hand control to `on_idle`.
    ///
    /// `on_idle` is where the host polls for input; returning `false` stops
    /// the loop.
    pub fn run(&mut self, mut on_idle: impl FnMut(&mut Self) -> bool) -> Result<(), FiberError> {
        loop {
            self.run_until_idle()?;
            if !on_idle(self) {
                debug!("run loop stopped");
                return Ok(());
            }
        }
    }

    /// Tear down the loop and hand back the host.
    pub fn unmount(self) -> H {
        self.scheduler.into_host()
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount `element` into `container`.
///
/// Nothing is rendered until the handle is ticked.
pub fn mount<H: HostBinding>(
    host: H,
    container: H::Node,
    element: Element,
    config: SchedulerConfig,
) -> MountHandle<H> {
    let mut scheduler = Scheduler::with_config(host, config);
    scheduler.render(element, container.clone());
    debug!(?container, "mounted");

    MountHandle {
        scheduler,
        container,
    }
}

// =============================================================================
// Tests
// =============================================================================
