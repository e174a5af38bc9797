//! Work Scheduler - cooperative, time-sliced render passes.
//!
//! # State machine
//!
//! ```text
//!          render() / state update
//!   IDLE ───────────────────────────► RENDERING ──(no work left)──► COMMITTING ──► IDLE
//!                                      │     ▲
//!                                      └─────┘ tick yields, resumes at next_unit
//! ```
//!
//! The scheduler never reschedules itself. The host integration layer calls
//! [`Scheduler::tick`] with a [`Deadline`]; each tick performs whole units of
//! work until the deadline runs low, then returns. A unit is one fiber and is
//! never split, so yielding loses nothing.
//!
//! # Traversal
//!
//! Depth-first pre-order: the fiber's child, else the nearest sibling found
//! while walking up through parents, else done.

use tracing::{debug, error, trace, warn};

use crate::config::SchedulerConfig;
use crate::element::{Element, ElementType};
use crate::engine::commit::{CommitReport, commit_root};
use crate::engine::fiber::{Fiber, FiberId, FiberTree};
use crate::engine::hooks::{RenderContext, RenderRequest};
use crate::engine::reconcile::reconcile_children;
use crate::error::FiberError;
use crate::host::HostBinding;
use crate::pipeline::Deadline;
use crate::types::Props;

/// Where the scheduler is in a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rendering,
    Committing,
}

/// How a tick ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// Deadline ran low with work remaining.
    Yielded,
    /// The pass finished and was committed.
    Committed(CommitReport),
}

/// Result of one [`Scheduler::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Units of work performed.
    pub units: usize,
    pub outcome: TickOutcome,
}

impl TickReport {
    pub fn committed(&self) -> Option<&CommitReport> {
        match &self.outcome {
            TickOutcome::Committed(report) => Some(report),
            _ => None,
        }
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Owner of all render state: fiber arena, root pointers, deletions, host.
pub struct Scheduler<H: HostBinding> {
    host: H,
    config: SchedulerConfig,
    tree: FiberTree<H::Node>,
    current_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    request: RenderRequest,
    phase: Phase,
    passes: u64,
}

impl<H: HostBinding> Scheduler<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, SchedulerConfig::default())
    }

    pub fn with_config(host: H, config: SchedulerConfig) -> Self {
        Self {
            host,
            config,
            tree: FiberTree::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            request: RenderRequest::new(),
            phase: Phase::Idle,
            passes: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn tree(&self) -> &FiberTree<H::Node> {
        &self.tree
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Root of the last committed tree.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the pass in progress.
    pub fn wip_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Render passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Whether a tick would do anything.
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || (self.request.is_pending() && self.current_root.is_some())
    }

    // -------------------------------------------------------------------------
    // Entry points
    // -------------------------------------------------------------------------

    /// Start a render pass of `element` into `container`.
    ///
    /// Any unfinished pass is abandoned.
    pub fn render(&mut self, element: Element, container: H::Node) {
        let props = Props::new().with_children(vec![element]);
        let root = self.tree.insert(Fiber::root(container, props, self.current_root));
        self.begin_pass(root, "render");
    }

    /// Perform units of work until `deadline` runs low or the pass completes.
    pub fn tick<D: Deadline + ?Sized>(&mut self, deadline: &D) -> Result<TickReport, FiberError> {
        self.absorb_render_request()?;

        if self.wip_root.is_none() {
            return Ok(TickReport {
                units: 0,
                outcome: TickOutcome::Idle,
            });
        }

        let mut units = 0;
        while let Some(unit) = self.next_unit {
            match self.perform_unit_of_work(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    self.abandon(&err);
                    return Err(err);
                }
            }
            units += 1;

            self.absorb_render_request()?;
            if deadline.time_remaining() < self.config.yield_threshold {
                break;
            }
        }

        if self.next_unit.is_some() {
            trace!(units, "yielding with work remaining");
            return Ok(TickReport {
                units,
                outcome: TickOutcome::Yielded,
            });
        }

        let report = self.commit()?;
        Ok(TickReport {
            units,
            outcome: TickOutcome::Committed(report),
        })
    }

    // -------------------------------------------------------------------------
    // Pass management
    // -------------------------------------------------------------------------

    fn begin_pass(&mut self, root: FiberId, reason: &'static str) {
        if let Some(superseded) = self.wip_root {
            debug!(?superseded, reason, "superseding unfinished render pass");
        }

        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.deletions.clear();
        self.phase = Phase::Rendering;
        self.passes += 1;
        debug!(pass = self.passes, reason, "render pass started");
    }

    /// Turn a raised state-update request into a fresh pass from the current root.
    ///
    /// Requests raised before the first commit wait for it.
    fn absorb_render_request(&mut self) -> Result<(), FiberError> {
        if !self.request.is_pending() {
            return Ok(());
        }
        let Some(current) = self.current_root else {
            trace!("state update deferred until first commit");
            return Ok(());
        };
        self.request.take();

        let fiber = self.tree.fiber(current)?;
        let (Some(node), props) = (fiber.node.clone(), fiber.props.clone()) else {
            return Err(FiberError::DetachedFiber(current));
        };

        let root = self.tree.insert(Fiber::root(node, props, Some(current)));
        self.begin_pass(root, "state update");
        Ok(())
    }

    fn abandon(&mut self, err: &FiberError) {
        error!(error = %err, pass = self.passes, "render pass abandoned");
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
        self.phase = Phase::Idle;
    }

    fn commit(&mut self) -> Result<CommitReport, FiberError> {
        let Some(root) = self.wip_root else {
            return Ok(CommitReport::default());
        };
        self.phase = Phase::Committing;

        let report = match commit_root(&mut self.host, &self.tree, root, &self.deletions) {
            Ok(report) => report,
            Err(err) => {
                self.abandon(&err);
                return Err(err);
            }
        };

        self.current_root = Some(root);
        self.wip_root = None;
        self.deletions.clear();
        let before = self.tree.len();
        let orphans = self.tree.retain_tree(root);
        let freed = before - self.tree.len();
        for node in &orphans {
            if let Err(err) = self.host.destroy_node(node) {
                warn!(error = %err, ?node, "failed to destroy orphaned host node");
            }
        }
        self.phase = Phase::Idle;

        debug!(
            pass = self.passes,
            placements = report.placements,
            updates = report.updates,
            deletions = report.deletions,
            patches = report.patches,
            freed,
            orphans = orphans.len(),
            "render pass committed"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Units of work
    // -------------------------------------------------------------------------

    fn perform_unit_of_work(&mut self, id: FiberId) -> Result<Option<FiberId>, FiberError> {
        let kind = self.tree.fiber(id)?.kind.clone();
        trace!(fiber = ?id, kind = kind.label(), "unit of work");

        match kind {
            ElementType::Component(component) => {
                let (props, alternate) = {
                    let fiber = self.tree.fiber(id)?;
                    (fiber.props.clone(), fiber.alternate)
                };
                let previous = match alternate {
                    Some(alternate) => Some(self.tree.fiber(alternate)?.hooks.clone()),
                    None => None,
                };

                let mut cx = RenderContext::new(component.name(), previous, self.request.clone());
                let child = component.render(&mut cx, &props);
                self.tree.fiber_mut(id)?.hooks = cx.finish()?;

                reconcile_children(&mut self.tree, &mut self.deletions, id, std::slice::from_ref(&child))?;
            }
            ElementType::Host(tag) => {
                let fiber = self.tree.fiber(id)?;
                let children = fiber.props.children().to_vec();

                if fiber.node.is_none() {
                    let node = self.host.create_node(&tag, &fiber.props)?;
                    self.tree.fiber_mut(id)?.node = Some(node);
                }

                reconcile_children(&mut self.tree, &mut self.deletions, id, &children)?;
            }
        }

        next_unit_of_work(&self.tree, id)
    }
}

/// Pre-order successor of `id`: child, else the nearest sibling up the parent chain.
pub fn next_unit_of_work<N>(tree: &FiberTree<N>, id: FiberId) -> Result<Option<FiberId>, FiberError> {
    if let Some(child) = tree.fiber(id)?.child {
        return Ok(Some(child));
    }

    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let fiber = tree.fiber(current)?;
        if let Some(sibling) = fiber.sibling {
            return Ok(Some(sibling));
        }
        cursor = fiber.parent;
    }
    Ok(None)
}
