//! Depth-bounded traversal and search over accessibility trees.
//!
//! Search walks pre-order. An `AXApplication` node contributes its
//! `AXExtrasMenuBar` and `AXMenuBar` element attributes ahead of its regular
//! children, since status-bar items are not reachable through `AXChildren`.
//! Snapshots mirror `AXChildren` only.

use super::platform::{attrs, Node};
use super::types::{MatchCriteria, Point, Snapshot};

const SATELLITES: [&str; 2] = [attrs::EXTRAS_MENU_BAR, attrs::MENU_BAR];

/// Capture the subtree under `root`; nodes at `depth >= max_depth` keep no children.
pub fn snapshot(root: &Node, max_depth: usize) -> Snapshot {
    snapshot_at(root, 0, max_depth)
}

fn snapshot_at(node: &Node, depth: usize, max_depth: usize) -> Snapshot {
    let children = if depth >= max_depth {
        Vec::new()
    } else {
        node.children()
            .iter()
            .map(|child| snapshot_at(child, depth + 1, max_depth))
            .collect()
    };
    Snapshot {
        info: node.info(),
        children,
    }
}

/// First node matching `criteria` in pre-order, or `None`
pub fn find_first(root: &Node, criteria: &MatchCriteria, max_depth: usize) -> Option<Node> {
    let mut found = None;
    visit(root, 0, max_depth, &mut |node| {
        if node.matches(criteria) {
            found = Some(node.clone());
            false
        } else {
            true
        }
    });
    found
}

/// Every node matching `criteria`, in pre-order
pub fn find_all(root: &Node, criteria: &MatchCriteria, max_depth: usize) -> Vec<Node> {
    let mut found = Vec::new();
    visit(root, 0, max_depth, &mut |node| {
        if node.matches(criteria) {
            found.push(node.clone());
        }
        true
    });
    found
}

/// Pre-order walk; `f` returns false to stop. Returns false once stopped.
fn visit(node: &Node, depth: usize, max_depth: usize, f: &mut dyn FnMut(&Node) -> bool) -> bool {
    if depth > max_depth {
        return true;
    }
    if !f(node) {
        return false;
    }

    if node.has_role(attrs::ROLE_APPLICATION) {
        for name in SATELLITES {
            if let Some(bar) = node.element_attribute(name) {
                if !visit(&bar, depth + 1, max_depth, f) {
                    return false;
                }
            }
        }
    }

    for child in node.children() {
        if !visit(&child, depth + 1, max_depth, f) {
            return false;
        }
    }
    true
}

/// Center of the node's frame, when it has both position and size
pub fn center(node: &Node) -> Option<Point> {
    let position = node.position()?;
    let size = node.size()?;
    Some(Point::new(position.x + size.w / 2.0, position.y + size.h / 2.0))
}
