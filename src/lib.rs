//! # spark-fiber
//!
//! Incremental UI rendering with fibers, for Rust.
//!
//! Give it a declarative element tree and a host to render into. It renders
//! the tree once, then on every state change computes the minimal set of host
//! mutations, doing the work in small slices so the host is never blocked for
//! long.
//!
//! ## Architecture
//!
//! Every rendered element is a fiber in a slot-map arena. Two trees coexist:
//! the current tree (last committed, visible) and the work-in-progress tree
//! (being built). Each work-in-progress fiber links to its counterpart in the
//! current tree through `alternate`, which is how nodes and hook state are
//! reused.
//!
//! ```text
//! Element tree → render() → tick(deadline) × N → commit → host mutations
//!                   ▲                                          │
//!                   └──────────── SetState::update ◄───────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Props, prop values, event handlers, reserved names
//! - [`element`] - Element descriptions, components, builders
//! - [`engine`] - Fiber arena, reconciler, scheduler, commit, hooks
//! - [`host`] - Host binding trait, props diff, memory and terminal hosts
//! - [`pipeline`] - Deadlines and the mount/run loop
//! - [`config`] - Scheduler timing configuration
//! - [`error`] - Error types

pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::SchedulerConfig;

pub use element::{Child, Component, Element, ElementType, component, create_element, text};

pub use engine::{
    CommitReport, EffectTag, FiberId, Phase, RenderContext, Scheduler, SetState, TickOutcome,
    TickReport,
};

pub use error::{FiberError, HostError};

pub use host::{
    Attr, HostBinding, HostCall, MemoryHost, NodeId, PropPatch, TerminalHost, diff_props,
};

pub use pipeline::{
    Deadline, FrameDeadline, MountHandle, RunReport, Unbounded, UnitDeadline, mount,
};
