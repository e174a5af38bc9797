//! Host bindings - where fibers meet concrete rendered nodes.
//!
//! The engine never touches a platform directly. It talks to a
//! [`HostBinding`], which creates nodes, applies prop patches, and attaches or
//! detaches nodes. Two bindings ship with the crate:
//!
//! - [`MemoryHost`] - an in-memory document with a call log (tests, demos)
//! - [`TerminalHost`] - paints that document to a terminal with crossterm
//!
//! # Props delta
//!
//! [`diff_props`] turns `(previous, next)` props into an ordered patch list:
//!
//! ```text
//! 1. RemoveListener  event key gone, or handler changed
//! 2. ClearProperty   plain key gone
//! 3. SetProperty     plain key new or changed
//! 4. AddListener     event key new, or handler changed
//! ```

pub mod memory;
pub mod terminal;

pub use memory::{HostCall, MemoryHost, NodeId};
pub use terminal::{Attr, TerminalHost};

use std::fmt;

use crate::error::HostError;
use crate::types::{EVENT_PREFIX, EventHandler, PropValue, Props, Tag};

// =============================================================================
// Host Binding
// =============================================================================

/// Platform adapter consumed by the scheduler and the commit phase.
///
/// Operations should leave the host unchanged when they fail; the engine does
/// not retry and does not roll back a partially applied commit.
pub trait HostBinding {
    /// Handle of a concrete node. Cloned into every fiber that reuses it.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Create a detached node for `tag` with `props` already applied.
    fn create_node(&mut self, tag: &Tag, props: &Props) -> Result<Self::Node, HostError>;

    /// Apply a single patch produced by [`diff_props`].
    fn apply_patch(&mut self, node: &Self::Node, patch: &PropPatch) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Release `node` and its subtree. The engine never uses the handle again.
    ///
    /// Called after a deleted node is detached, and for nodes created by a
    /// render pass that was superseded before it committed.
    fn destroy_node(&mut self, node: &Self::Node) -> Result<(), HostError>;

    /// Bring `node` from `previous` to `next`. Returns the number of patches applied.
    fn update_node(
        &mut self,
        node: &Self::Node,
        previous: &Props,
        next: &Props,
    ) -> Result<usize, HostError> {
        let patches = diff_props(previous, next);
        for patch in &patches {
            self.apply_patch(node, patch)?;
        }
        Ok(patches.len())
    }
}

// =============================================================================
// Prop Patches
// =============================================================================

/// One host-side mutation of a node's props.
#[derive(Debug, Clone, PartialEq)]
pub enum PropPatch {
    RemoveListener { event: String, handler: EventHandler },
    ClearProperty { name: String },
    SetProperty { name: String, value: PropValue },
    AddListener { event: String, handler: EventHandler },
}

/// Whether `key` names an event listener.
pub fn is_event_key(key: &str) -> bool {
    key.starts_with(EVENT_PREFIX)
}

/// Listener type for an event key: prefix stripped, lower-cased (`onClick` → `click`).
pub fn event_type(key: &str) -> String {
    key.strip_prefix(EVENT_PREFIX).unwrap_or(key).to_lowercase()
}

/// Patches that take a node from `previous` props to `next` props.
pub fn diff_props(previous: &Props, next: &Props) -> Vec<PropPatch> {
    let mut patches = Vec::new();
    let changed = |key: &str, value: &PropValue| next.get(key) != Some(value);

    for (key, value) in previous.iter().filter(|(k, _)| is_event_key(k)) {
        if changed(key, value) {
            if let PropValue::Handler(handler) = value {
                patches.push(PropPatch::RemoveListener {
                    event: event_type(key),
                    handler: handler.clone(),
                });
            }
        }
    }

    for (key, _) in previous.iter().filter(|(k, _)| !is_event_key(k)) {
        if !next.contains(key) {
            patches.push(PropPatch::ClearProperty {
                name: key.to_string(),
            });
        }
    }

    for (key, value) in next.iter().filter(|(k, _)| !is_event_key(k)) {
        if previous.get(key) != Some(value) {
            patches.push(PropPatch::SetProperty {
                name: key.to_string(),
                value: value.clone(),
            });
        }
    }

    for (key, value) in next.iter().filter(|(k, _)| is_event_key(k)) {
        if previous.get(key) != Some(value) {
            if let PropValue::Handler(handler) = value {
                patches.push(PropPatch::AddListener {
                    event: event_type(key),
                    handler: handler.clone(),
                });
            }
        }
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        assert_eq!(event_type("onClick"), "click");
        assert_eq!(event_type("onMouseMove"), "mousemove");
        assert!(is_event_key("onClick"));
        assert!(!is_event_key("title"));
    }

    #[test]
    fn test_initial_props() {
        let click = EventHandler::new(|_| {});
        let next = Props::new().with("id", "a").with("onClick", click.clone());

        let patches = diff_props(&Props::new(), &next);

        assert_eq!(
            patches,
            vec![
                PropPatch::SetProperty { name: "id".into(), value: "a".into() },
                PropPatch::AddListener { event: "click".into(), handler: click },
            ]
        );
    }

    #[test]
    fn test_unchanged_props_produce_nothing() {
        let click = EventHandler::new(|_| {});
        let props = Props::new().with("id", "a").with("onClick", click);
        assert!(diff_props(&props, &props.clone()).is_empty());
    }

    #[test]
    fn test_removed_and_changed() {
        let old_click = EventHandler::new(|_| {});
        let new_click = EventHandler::new(|_| {});
        let hover = EventHandler::new(|_| {});

        let previous = Props::new()
            .with("id", "a")
            .with("title", "gone")
            .with("onClick", old_click.clone())
            .with("onHover", hover.clone());
        let next = Props::new().with("id", "b").with("onClick", new_click.clone());

        let patches = diff_props(&previous, &next);

        assert_eq!(
            patches,
            vec![
                PropPatch::RemoveListener { event: "click".into(), handler: old_click },
                PropPatch::RemoveListener { event: "hover".into(), handler: hover },
                PropPatch::ClearProperty { name: "title".into() },
                PropPatch::SetProperty { name: "id".into(), value: "b".into() },
                PropPatch::AddListener { event: "click".into(), handler: new_click },
            ]
        );
    }

    #[test]
    fn test_listener_removal_uses_each_key() {
        // Every removed listener is named after its own key.
        let a = EventHandler::new(|_| {});
        let b = EventHandler::new(|_| {});
        let previous = Props::new().with("onKeyDown", a).with("onBlur", b);

        let events: Vec<String> = diff_props(&previous, &Props::new())
            .into_iter()
            .filter_map(|patch| match patch {
                PropPatch::RemoveListener { event, .. } => Some(event),
                _ => None,
            })
            .collect();

        assert_eq!(events, vec!["keydown", "blur"]);
    }
}
