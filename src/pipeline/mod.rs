//! Run loop - the host integration layer.
//!
//! The scheduler only knows how to perform one tick against a deadline. This
//! module owns the loop around it:
//!
//! ```text
//! mount() ──► tick(FrameDeadline) ──► tick ──► ... ──► idle ──► on_idle() ──► tick ...
//! ```
//!
//! ## Key Design Principles
//!
//! - **One tick, one deadline**: every tick gets a fresh `frame_budget`
//! - **No self-scheduling**: the loop is explicit and can be driven tick by tick

pub mod deadline;
pub mod mount;

pub use deadline::{Deadline, FrameDeadline, Unbounded, UnitDeadline};
pub use mount::{MountHandle, RunReport, mount};
