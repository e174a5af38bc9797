//! Commit Phase - apply a finished work-in-progress tree to the host.
//!
//! Runs synchronously in one go:
//!
//! 1. Deletions first. Component fibers own no node, so each deletion walks
//!    down to the nearest node-owning descendants, detaches them from the
//!    nearest node-owning ancestor in the old tree, and destroys them.
//! 2. The root's subtree in pre-order: PLACEMENT appends, UPDATE patches props.
//!
//! A host failure stops the walk where it happened. Nothing is rolled back.

use tracing::trace;

use crate::engine::fiber::{EffectTag, FiberId, FiberTree};
use crate::error::FiberError;
use crate::host::HostBinding;

/// What a commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Fibers tagged PLACEMENT (host and component).
    pub placements: usize,
    /// Fibers tagged UPDATE (host and component).
    pub updates: usize,
    /// Entries of the deletions list.
    pub deletions: usize,
    /// Host nodes appended.
    pub insertions: usize,
    /// Host nodes detached.
    pub removals: usize,
    /// Prop patches applied to existing nodes.
    pub patches: usize,
}

/// Apply `deletions` and the subtree of `root` through `host`.
pub fn commit_root<H: HostBinding>(
    host: &mut H,
    tree: &FiberTree<H::Node>,
    root: FiberId,
    deletions: &[FiberId],
) -> Result<CommitReport, FiberError> {
    let mut report = CommitReport::default();

    for &deleted in deletions {
        let parent = tree.host_parent(deleted)?;
        report.removals += remove_host_nodes(host, tree, deleted, parent)?;
        report.deletions += 1;
    }

    for id in tree.preorder(root).into_iter().skip(1) {
        let fiber = tree.fiber(id)?;

        match fiber.effect {
            Some(EffectTag::Placement) => {
                report.placements += 1;
                if let Some(node) = &fiber.node {
                    let parent = tree.host_parent(id)?;
                    host.append_child(parent, node)?;
                    report.insertions += 1;
                    trace!(fiber = ?id, kind = fiber.kind.label(), "placed");
                }
            }
            Some(EffectTag::Update) => {
                report.updates += 1;
                if let Some(node) = &fiber.node {
                    let previous = match fiber.alternate {
                        Some(alternate) => &tree.fiber(alternate)?.props,
                        None => continue,
                    };
                    let applied = host.update_node(node, previous, &fiber.props)?;
                    if applied > 0 {
                        trace!(fiber = ?id, kind = fiber.kind.label(), applied, "updated");
                    }
                    report.patches += applied;
                }
            }
            // Deleted fibers belong to the old tree and were handled above.
            Some(EffectTag::Deletion) | None => {}
        }
    }

    Ok(report)
}

/// Detach the node-owning fibers at the top of `id`'s subtree from `parent`
/// and release them.
fn remove_host_nodes<H: HostBinding>(
    host: &mut H,
    tree: &FiberTree<H::Node>,
    id: FiberId,
    parent: &H::Node,
) -> Result<usize, FiberError> {
    let fiber = tree.fiber(id)?;
    if let Some(node) = &fiber.node {
        host.remove_child(parent, node)?;
        host.destroy_node(node)?;
        trace!(fiber = ?id, kind = fiber.kind.label(), "removed");
        return Ok(1);
    }

    let mut removed = 0;
    for child in tree.children(id) {
        removed += remove_host_nodes(host, tree, child, parent)?;
    }
    Ok(removed)
}
