//! Hook Store - per-fiber state cells and update requests.
//!
//! Every render of a component fiber gets a fresh [`RenderContext`]. Hook calls
//! are matched to the previous render's cells by call order alone:
//!
//! ```text
//! previous render (alternate)           this render (new fiber)
//! hooks[0]: state=3, applied=0   ──►   hooks[0]: state=4, applied=1
//!              └──── queue [+1] shared by both ────┘
//! hooks[1]: state="a", applied=0 ──►   hooks[1]: state="a", applied=0
//! ```
//!
//! Every cell of one hook position shares a single update queue, and a
//! [`SetState`] handle pushes onto that queue. An update therefore reaches the
//! live cell whichever render handed out the setter, and an update requested
//! during a render is folded in on the cell's next read. Reading never drains
//! the queue, so a superseded pass loses nothing.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::FiberError;

/// Type-erased hook cell stored on a fiber.
pub(crate) type HookSlot = Rc<dyn Any>;

type Update<S> = Rc<dyn Fn(&S) -> S>;

// =============================================================================
// State Cell
// =============================================================================

/// Update log shared by every cell of one hook position.
///
/// Updates are numbered from the first push. Entries a committed cell has
/// already folded into its state are pruned on the next read.
struct UpdateQueue<S> {
    updates: RefCell<VecDeque<Update<S>>>,
    offset: Cell<u64>,
}

impl<S> UpdateQueue<S> {
    fn new() -> Self {
        Self {
            updates: RefCell::new(VecDeque::new()),
            offset: Cell::new(0),
        }
    }

    fn push(&self, update: Update<S>) {
        self.updates.borrow_mut().push_back(update);
    }

    fn end(&self) -> u64 {
        self.offset.get() + self.updates.borrow().len() as u64
    }

    /// Drop every update numbered below `seq`.
    fn prune(&self, seq: u64) {
        let mut updates = self.updates.borrow_mut();
        while self.offset.get() < seq && updates.pop_front().is_some() {
            self.offset.set(self.offset.get() + 1);
        }
    }

    /// Updates numbered `seq` and later, oldest first.
    fn since(&self, seq: u64) -> Vec<Update<S>> {
        let skip = seq.saturating_sub(self.offset.get()) as usize;
        self.updates.borrow().iter().skip(skip).cloned().collect()
    }
}

/// State of one `use_state` call as of one render.
pub struct StateCell<S> {
    state: S,
    /// Sequence number of the first update not folded into `state`.
    applied: u64,
    queue: Rc<UpdateQueue<S>>,
}

impl<S> StateCell<S> {
    /// Number of queued updates not yet folded into this cell.
    pub fn pending(&self) -> usize {
        (self.queue.end() - self.applied) as usize
    }
}

// =============================================================================
// Render Request
// =============================================================================

/// Shared flag raised by state setters and consumed by the scheduler.
#[derive(Clone, Default)]
pub struct RenderRequest {
    pending: Rc<Cell<bool>>,
    raised: Rc<Cell<u64>>,
}

impl RenderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.pending.set(true);
        self.raised.set(self.raised.get() + 1);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total number of raises since creation.
    pub fn raised(&self) -> u64 {
        self.raised.get()
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("pending", &self.pending.get())
            .field("raised", &self.raised.get())
            .finish()
    }
}

// =============================================================================
// SetState
// =============================================================================

/// Update-request function returned by [`RenderContext::use_state`].
///
/// Targets the hook position rather than one render's cell, so a handle from
/// any earlier render still reaches the live cell.
pub struct SetState<S> {
    queue: Rc<UpdateQueue<S>>,
    request: RenderRequest,
}

impl<S: 'static> SetState<S> {
    /// Queue `f` on the live cell and request a render pass from the root.
    ///
    /// Queued updates are applied oldest-first on the cell's next read,
    /// including updates requested while the component is rendering.
    pub fn update(&self, f: impl Fn(&S) -> S + 'static) {
        self.queue.push(Rc::new(f));
        self.request.raise();
    }

    /// Replace the state with `value`.
    pub fn set(&self, value: S)
    where
        S: Clone,
    {
        self.update(move |_| value.clone());
    }

    /// Updates queued and not yet pruned by a later read.
    pub fn pending(&self) -> usize {
        self.queue.updates.borrow().len()
    }
}

impl<S> Clone for SetState<S> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
        }
    }
}

// =============================================================================
// Render Context
// =============================================================================

/// Hook access for one invocation of a component.
pub struct RenderContext {
    component: String,
    /// Hooks of the alternate fiber; `None` on first mount.
    previous: Option<Vec<HookSlot>>,
    hooks: Vec<HookSlot>,
    index: usize,
    request: RenderRequest,
    error: Option<FiberError>,
}

impl RenderContext {
    pub(crate) fn new(component: &str, previous: Option<Vec<HookSlot>>, request: RenderRequest) -> Self {
        Self {
            component: component.to_string(),
            previous,
            hooks: Vec::new(),
            index: 0,
            request,
            error: None,
        }
    }

    /// Read the state cell at the current hook position.
    ///
    /// On first mount the state is `initial`. Afterwards it is the previous
    /// cell's state with that cell's queued updates applied in call order.
    pub fn use_state<S: Clone + 'static>(&mut self, initial: S) -> (S, SetState<S>) {
        let index = self.index;
        self.index += 1;

        let prior = self.previous.as_ref().and_then(|hooks| hooks.get(index)).cloned();
        let cell = match prior.map(|slot| slot.downcast::<StateCell<S>>()) {
            Some(Ok(prior)) => {
                // Everything below `prior.applied` is in committed state.
                prior.queue.prune(prior.applied);
                let updates = prior.queue.since(prior.applied);

                let mut state = prior.state.clone();
                for action in &updates {
                    state = action(&state);
                }
                if !updates.is_empty() {
                    trace!(component = %self.component, index, applied = updates.len(), "hook queue applied");
                }

                StateCell {
                    state,
                    applied: prior.applied + updates.len() as u64,
                    queue: prior.queue.clone(),
                }
            }
            Some(Err(_)) => {
                if self.error.is_none() {
                    self.error = Some(FiberError::HookMismatch {
                        component: self.component.clone(),
                        index,
                    });
                }
                StateCell { state: initial, applied: 0, queue: Rc::new(UpdateQueue::new()) }
            }
            None => StateCell { state: initial, applied: 0, queue: Rc::new(UpdateQueue::new()) },
        };

        let state = cell.state.clone();
        let setter = SetState {
            queue: cell.queue.clone(),
            request: self.request.clone(),
        };
        self.hooks.push(Rc::new(cell));

        (state, setter)
    }

    /// Hook calls made so far in this render.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// The cells built by this render, or the first contract violation.
    pub(crate) fn finish(self) -> Result<Vec<HookSlot>, FiberError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(previous) = &self.previous {
            if previous.len() != self.hooks.len() {
                return Err(FiberError::HookCountChanged {
                    expected: previous.len(),
                    found: self.hooks.len(),
                    component: self.component,
                });
            }
        }
        Ok(self.hooks)
    }
}
