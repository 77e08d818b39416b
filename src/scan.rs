//! Containment scanning
//!
//! The primitive every other search builds on: find the nodes under a
//! starting point whose label matches any pattern of a list. Nonterminals
//! and leaves are checked independently (a word can look like a category),
//! and the results are all matching nonterminals in pre-order followed by
//! all matching leaves in sentence order.

use crate::pattern::Pattern;
use crate::tree::{NodeId, Tree};

#[inline]
pub(crate) fn matches_any(tree: &Tree, node: NodeId, patterns: &[Pattern]) -> bool {
    let label = tree.label(node);
    patterns.iter().any(|p| p.is_match(label))
}

/// Nodes at or below `root` matching any of `patterns`
///
/// `root` itself is included when it matches.
pub fn scan(tree: &Tree, root: NodeId, patterns: &[Pattern]) -> Vec<NodeId> {
    let span = tree.span(root);

    let nonterminals = span
        .clone()
        .filter(|&n| !tree.is_leaf(n) && matches_any(tree, n, patterns));
    let leaves = span.filter(|&n| tree.is_leaf(n) && matches_any(tree, n, patterns));

    nonterminals.chain(leaves).collect()
}

/// Direct children of `parent` matching `pattern`, in order
pub fn children_matching(tree: &Tree, parent: NodeId, pattern: &Pattern) -> Vec<NodeId> {
    tree.children(parent)
        .iter()
        .copied()
        .filter(|&c| pattern.is_match(tree.label(c)))
        .collect()
}
