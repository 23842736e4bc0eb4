//! Block closing discipline and list-tightness computation.

use crate::tree::{BlockKind, NodeId, Tree};

/// Close `id`, computing any close-time-only properties first. A list's
/// `tight` flag is exactly one such property: it can only
/// be known once every child item (and every child of every item) has
/// stopped accepting lines.
pub(crate) fn finalize_node(tree: &mut Tree, id: NodeId) {
    if !tree.is_open(id) {
        return;
    }
    if matches!(tree.get(id).kind, BlockKind::List { .. }) {
        let tight = compute_tightness(tree, id);
        if let BlockKind::List { tight: slot, .. } = &mut tree.get_mut(id).kind {
            *slot = tight;
        }
    }
    tree.close(id);
}

fn has_gap(tree: &Tree, earlier: NodeId, later: NodeId) -> bool {
    tree.get(earlier).end_line_index + 1 < tree.get(later).start_line_index
}

fn compute_tightness(tree: &Tree, list_id: NodeId) -> bool {
    let items = &tree.get(list_id).children;
    for pair in items.windows(2) {
        if has_gap(tree, pair[0], pair[1]) {
            return false;
        }
    }
    for &item_id in items {
        let children = &tree.get(item_id).children;
        for pair in children.windows(2) {
            if has_gap(tree, pair[0], pair[1]) {
                return false;
            }
        }
    }
    true
}
