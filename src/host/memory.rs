//! In-memory host - a tiny document tree with a call log.
//!
//! Nodes live in a slot map and are addressed by [`NodeId`]. Destroying a node
//! frees its whole subtree, so a long-running document only holds what is
//! reachable or still pending. Every call the engine makes through
//! [`HostBinding`] is recorded as a [`HostCall`], which is what tests assert
//! against.

use std::fmt;

use indexmap::IndexMap;
use slotmap::{Key, SlotMap, new_key_type};

use super::{HostBinding, PropPatch};
use crate::error::HostError;
use crate::types::{Event, EventHandler, NODE_VALUE, PropValue, Props, Tag};

new_key_type! {
    /// Handle of a node in a [`MemoryHost`].
    pub struct NodeId;
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?}", self.data())
    }
}

/// A recorded host binding call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Create { node: NodeId, tag: Tag },
    Patch { node: NodeId, patch: PropPatch },
    Append { parent: NodeId, child: NodeId },
    Remove { parent: NodeId, child: NodeId },
    Destroy { node: NodeId, tag: Tag },
}

impl HostCall {
    /// Whether the call changes a node that may be attached.
    ///
    /// Creating a detached node is not a mutation.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, HostCall::Create { .. })
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: Tag,
    properties: IndexMap<String, PropValue>,
    listeners: Vec<(String, EventHandler)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl MemoryNode {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            properties: IndexMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    fn apply(&mut self, patch: &PropPatch) {
        match patch {
            PropPatch::RemoveListener { event, handler } => {
                if let Some(pos) = self
                    .listeners
                    .iter()
                    .position(|(e, h)| e == event && h == handler)
                {
                    self.listeners.remove(pos);
                }
            }
            PropPatch::ClearProperty { name } => {
                self.properties.shift_remove(name);
            }
            PropPatch::SetProperty { name, value } => {
                self.properties.insert(name.clone(), value.clone());
            }
            PropPatch::AddListener { event, handler } => {
                let present = self.listeners.iter().any(|(e, h)| e == event && h == handler);
                if !present {
                    self.listeners.push((event.clone(), handler.clone()));
                }
            }
        }
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

/// In-memory document implementing [`HostBinding`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: SlotMap<NodeId, MemoryNode>,
    calls: Vec<HostCall>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an attachment point. Not recorded in the call log.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(MemoryNode::new(Tag::from(tag)))
    }

    fn node(&self, id: NodeId) -> Result<&MemoryNode, HostError> {
        self.nodes.get(id).ok_or_else(|| HostError::UnknownNode(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(id).ok_or_else(|| HostError::UnknownNode(id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Call log
    // -------------------------------------------------------------------------

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_mutation()).count()
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Live nodes, containers included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        self.nodes.get(id).map(|n| &n.tag)
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.nodes.get(id).and_then(|n| n.properties.get(name))
    }

    pub fn properties(&self, id: NodeId) -> Vec<(&str, &PropValue)> {
        self.nodes
            .get(id)
            .map(|n| n.properties.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.nodes
            .get(id)
            .map(|n| n.listeners.iter().filter(|(e, _)| e == event).count())
            .unwrap_or(0)
    }

    /// First node with `tag` under `root`, in pre-order (root included).
    pub fn find(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        let node = self.nodes.get(root)?;
        if node.tag.as_str() == tag {
            return Some(root);
        }
        node.children.iter().find_map(|&child| self.find(child, tag))
    }

    /// Invoke every `event` listener on `id`. Returns how many ran.
    pub fn dispatch(&self, id: NodeId, event: &str) -> Result<usize, HostError> {
        let handlers: Vec<EventHandler> = self
            .node(id)?
            .listeners
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, h)| h.clone())
            .collect();

        let payload = Event::new(event);
        for handler in &handlers {
            handler.call(&payload);
        }
        Ok(handlers.len())
    }

    /// Markup of `id` and its subtree, e.g. `<div id="a"><p>B</p></div>`.
    ///
    /// Text nodes print their `nodeValue`; listeners are omitted.
    pub fn markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    /// Markup of the children of `id`, without `id` itself.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else { return };

        if node.tag.is_text() {
            if let Some(value) = node.properties.get(NODE_VALUE) {
                out.push_str(&value.to_string());
            }
            return;
        }

        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.properties {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        for &child in &node.children {
            self.write_markup(child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

impl HostBinding for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, tag: &Tag, props: &Props) -> Result<NodeId, HostError> {
        let mut node = MemoryNode::new(tag.clone());
        for patch in super::diff_props(&Props::new(), props) {
            node.apply(&patch);
        }

        let id = self.nodes.insert(node);
        self.calls.push(HostCall::Create {
            node: id,
            tag: tag.clone(),
        });
        Ok(id)
    }

    fn apply_patch(&mut self, node: &NodeId, patch: &PropPatch) -> Result<(), HostError> {
        self.node_mut(*node)?.apply(patch);
        self.calls.push(HostCall::Patch {
            node: *node,
            patch: patch.clone(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.node(*parent)?;

        // A node has one parent; appending moves it.
        if let Some(old_parent) = self.node(*child)?.parent {
            self.node_mut(old_parent)?.children.retain(|c| c != child);
        }

        self.node_mut(*parent)?.children.push(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.calls.push(HostCall::Append {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        let position = self
            .node(*parent)?
            .children
            .iter()
            .position(|c| c == child)
            .ok_or_else(|| HostError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            })?;

        self.node_mut(*parent)?.children.remove(position);
        self.node_mut(*child)?.parent = None;
        self.calls.push(HostCall::Remove {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn destroy_node(&mut self, node: &NodeId) -> Result<(), HostError> {
        let tag = self.node(*node)?.tag.clone();
        if let Some(parent) = self.node(*node)?.parent {
            self.node_mut(parent)?.children.retain(|c| c != node);
        }

        let mut stack = vec![*node];
        while let Some(id) = stack.pop() {
            if let Some(freed) = self.nodes.remove(id) {
                stack.extend(freed.children);
            }
        }

        self.calls.push(HostCall::Destroy { node: *node, tag });
        Ok(())
    }
}
