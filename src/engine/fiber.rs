//! Fiber arena - the dual-buffered work tree.
//!
//! Fibers are NOT linked objects. They are entries in a slot map, and every
//! tree link is an optional [`FiberId`]:
//!
//! ```text
//! current tree            work-in-progress tree
//! #root ◄──────alternate── #root
//!   │child                   │child
//!   div ◄──────alternate──── div
//!   │child                   │child
//!   h1 ──sibling──► p        h1 ──sibling──► p
//! ```
//!
//! `parent`/`child`/`sibling` form a first-child/next-sibling tree. `alternate`
//! points from a work-in-progress fiber to the fiber at the same position in
//! the last committed tree. After a commit everything not reachable from the
//! new current root is dropped in one pass.

use std::collections::HashSet;

use slotmap::{SlotMap, new_key_type};

use crate::element::{Element, ElementType};
use crate::engine::hooks::HookSlot;
use crate::error::FiberError;
use crate::types::{Props, ROOT_TAG, Tag};

new_key_type! {
    /// Handle of a fiber in the arena.
    pub struct FiberId;
}

/// Commit-time action a fiber requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTag {
    Placement,
    Update,
    Deletion,
}

// =============================================================================
// Fiber
// =============================================================================

/// One element at one render pass.
pub struct Fiber<N> {
    pub kind: ElementType,
    pub props: Props,
    /// Concrete host node. Always `None` for component fibers.
    pub node: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect: Option<EffectTag>,
    /// Hook cells, rebuilt on every render of a component fiber.
    pub(crate) hooks: Vec<HookSlot>,
}

impl<N> Fiber<N> {
    /// Root fiber wrapping the host attachment point.
    pub fn root(node: N, props: Props, alternate: Option<FiberId>) -> Self {
        Self {
            kind: ElementType::Host(Tag::from(ROOT_TAG)),
            props,
            node: Some(node),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: None,
            hooks: Vec::new(),
        }
    }

    /// Fresh fiber for an element with no reusable predecessor.
    pub fn placement(element: &Element, parent: FiberId) -> Self {
        Self {
            kind: element.kind.clone(),
            props: element.props.clone(),
            node: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: Some(EffectTag::Placement),
            hooks: Vec::new(),
        }
    }

    /// Fiber reusing `node` from its predecessor `alternate`.
    pub fn update(element: &Element, parent: FiberId, node: Option<N>, alternate: FiberId) -> Self {
        Self {
            kind: element.kind.clone(),
            props: element.props.clone(),
            node,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: Some(alternate),
            effect: Some(EffectTag::Update),
            hooks: Vec::new(),
        }
    }

    pub fn is_component(&self) -> bool {
        self.kind.is_component()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

// =============================================================================
// Fiber Tree
// =============================================================================

/// Arena holding the current tree, the work-in-progress tree, and any
/// abandoned fibers awaiting the next prune.
pub struct FiberTree<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
}

impl<N> FiberTree<N> {
    pub fn new() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    /// Like [`get`](Self::get), but a freed handle is an error.
    pub fn fiber(&self, id: FiberId) -> Result<&Fiber<N>, FiberError> {
        self.fibers.get(id).ok_or(FiberError::StaleFiber(id))
    }

    pub fn fiber_mut(&mut self, id: FiberId) -> Result<&mut Fiber<N>, FiberError> {
        self.fibers.get_mut(id).ok_or(FiberError::StaleFiber(id))
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of live arena entries.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Direct children of `id`, first to last.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|f| f.child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.get(child).and_then(|f| f.sibling);
        }
        out
    }

    /// `root` and its descendants in pre-order (child before sibling).
    ///
    /// Siblings of `root` itself are not visited.
    pub fn preorder(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let Some(fiber) = self.get(id) else { continue };
            out.push(id);

            if id != root {
                if let Some(sibling) = fiber.sibling {
                    stack.push(sibling);
                }
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
        }

        out
    }

    /// Nearest ancestor of `id` that owns a host node.
    pub fn host_parent(&self, id: FiberId) -> Result<&N, FiberError> {
        let mut cursor = self.fiber(id)?.parent;
        while let Some(parent) = cursor {
            let fiber = self.fiber(parent)?;
            if let Some(node) = &fiber.node {
                return Ok(node);
            }
            cursor = fiber.parent;
        }
        Err(FiberError::DetachedFiber(id))
    }

    /// Drop every fiber not reachable from `root`.
    ///
    /// Survivors lose their `alternate` link and effect tag: the previous tree
    /// they pointed into is gone. Returns the nodes of dropped PLACEMENT
    /// fibers. Those were created for a pass that never committed and nothing
    /// references them any more.
    pub fn retain_tree(&mut self, root: FiberId) -> Vec<N> {
        let live: HashSet<FiberId> = self.preorder(root).into_iter().collect();
        let mut orphans = Vec::new();

        self.fibers.retain(|id, fiber| {
            if live.contains(&id) {
                fiber.alternate = None;
                fiber.effect = None;
                return true;
            }
            if fiber.effect == Some(EffectTag::Placement) {
                orphans.extend(fiber.node.take());
            }
            false
        });

        orphans
    }
}

impl<N> Default for FiberTree<N> {
    fn default() -> Self {
        Self::new()
    }
}
