//! Error types.
//!
//! Two layers: [`HostError`] is what a host binding reports, [`FiberError`] is
//! what the engine surfaces from `tick`. A type mismatch during diffing is
//! never an error; it is the normal placement/deletion signal.

use thiserror::Error;

use crate::engine::FiberId;

/// Failure reported by a [`HostBinding`](crate::host::HostBinding).
#[derive(Debug, Error)]
pub enum HostError {
    /// The node handle does not name a live node.
    #[error("unknown host node {0}")]
    UnknownNode(String),

    /// `remove_child` was asked to detach a node from a parent it is not under.
    #[error("host node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },

    /// Terminal or other output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure surfaced by the scheduler.
///
/// When a render pass fails, the work-in-progress tree is abandoned and the
/// scheduler returns to idle. Host failures during commit leave the host tree
/// partially updated.
#[derive(Debug, Error)]
pub enum FiberError {
    #[error("host binding failed: {0}")]
    Host(#[from] HostError),

    /// A hook at `index` was read with a different state type than the one
    /// stored there by the previous render.
    #[error("component `{component}` read hook {index} with a different state type than its previous render")]
    HookMismatch { component: String, index: usize },

    /// The number of hook calls changed between renders of the same position.
    #[error("component `{component}` made {found} hook calls, previous render made {expected}")]
    HookCountChanged {
        component: String,
        expected: usize,
        found: usize,
    },

    /// A fiber handle no longer names a live arena entry.
    #[error("fiber {0:?} is no longer in the arena")]
    StaleFiber(FiberId),

    /// No ancestor of the fiber owns a host node.
    #[error("fiber {0:?} has no ancestor owning a host node")]
    DetachedFiber(FiberId),

    /// The run loop kept finding work after the configured number of ticks.
    #[error("render loop did not settle within {0} ticks")]
    TickLimit(usize),
}
