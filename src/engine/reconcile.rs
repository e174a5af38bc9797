//! Reconciler - positional diff of an element list against the old child chain.
//!
//! # Algorithm
//!
//! Walk the new elements by index in parallel with the old chain
//! (`wip.alternate.child`, then `sibling`):
//!
//! 1. Same type at the same index: new fiber, same node, `alternate = old`, UPDATE
//! 2. New element, no compatible old fiber: fresh fiber, PLACEMENT
//! 3. Old fiber, no compatible new element: old fiber tagged DELETION and
//!    pushed to the deletions list (nothing in the new tree carries it)
//!
//! There are no keys. Reordering the same items produces PLACEMENT/DELETION
//! pairs instead of moves.

use tracing::trace;

use crate::element::Element;
use crate::engine::fiber::{EffectTag, Fiber, FiberId, FiberTree};
use crate::error::FiberError;

/// Build the new child chain of `wip` from `elements`.
///
/// Unmatched old fibers are appended to `deletions`.
pub fn reconcile_children<N: Clone>(
    tree: &mut FiberTree<N>,
    deletions: &mut Vec<FiberId>,
    wip: FiberId,
    elements: &[Element],
) -> Result<(), FiberError> {
    let mut old = match tree.fiber(wip)?.alternate {
        Some(alternate) => tree.fiber(alternate)?.child,
        None => None,
    };
    let mut previous: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);

        let (same_type, old_node, old_sibling) = match old {
            Some(old_id) => {
                let old_fiber = tree.fiber(old_id)?;
                let same = element.is_some_and(|el| old_fiber.kind.same_type(&el.kind));
                (same, old_fiber.node.clone(), old_fiber.sibling)
            }
            None => (false, None, None),
        };

        let produced = match (element, old) {
            (Some(el), Some(old_id)) if same_type => {
                Some(tree.insert(Fiber::update(el, wip, old_node, old_id)))
            }
            (Some(el), _) => Some(tree.insert(Fiber::placement(el, wip))),
            (None, _) => None,
        };

        if !same_type {
            if let Some(old_id) = old {
                tree.fiber_mut(old_id)?.effect = Some(EffectTag::Deletion);
                deletions.push(old_id);
                trace!(fiber = ?old_id, index, "old fiber marked for deletion");
            }
        }

        if let Some(new_id) = produced {
            match previous {
                None => tree.fiber_mut(wip)?.child = Some(new_id),
                Some(prev) => tree.fiber_mut(prev)?.sibling = Some(new_id),
            }
            previous = Some(new_id);
        }

        old = old_sibling;
        index += 1;
    }

    Ok(())
}
