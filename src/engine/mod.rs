//! Fiber engine - arena, reconciler, scheduler, commit, hooks.
//!
//! The engine manages the core data structures:
//! - Fiber: one element at one render pass, stored in a slot-map arena
//! - Reconciler: positional diff producing PLACEMENT/UPDATE/DELETION fibers
//! - Scheduler: time-sliced depth-first walk, one fiber per unit of work
//! - Commit: applies a finished tree through the host binding
//! - Hooks: ordered state cells carried across renders via `alternate`
//!
//! # Architecture
//!
//! ```text
//! render()/SetState ──► root fiber ──► tick(deadline) ──► unit of work ──► reconcile
//!                                          │                                   │
//!                                          └──── no work left ──► commit ◄─────┘
//! ```

mod commit;
mod fiber;
mod hooks;
mod reconcile;
mod scheduler;

pub use commit::{CommitReport, commit_root};
pub use fiber::{EffectTag, Fiber, FiberId, FiberTree};
pub use hooks::{RenderContext, RenderRequest, SetState, StateCell};
pub use reconcile::reconcile_children;
pub use scheduler::{Phase, Scheduler, TickOutcome, TickReport, next_unit_of_work};
