//! Constituency tree data structures
//!
//! Trees are stored as arenas of nodes in pre-order, so the subtree rooted
//! at any node is a contiguous id range. Labels are interned in a
//! [`LabelPool`] shared by every tree read from the same treebank.

use lasso::{Spur, ThreadedRodeo};
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Index of a node within its tree's arena
pub type NodeId = usize;

/// Shared interner for node labels and leaf words
#[derive(Clone)]
pub struct LabelPool(Arc<ThreadedRodeo<Spur, FxBuildHasher>>);

impl LabelPool {
    pub fn new() -> Self {
        Self(Arc::new(ThreadedRodeo::with_hasher(FxBuildHasher)))
    }

    #[inline]
    pub fn get_or_intern(&self, label: &str) -> Spur {
        self.0.get_or_intern(label)
    }

    #[inline]
    pub fn resolve(&self, sym: &Spur) -> &str {
        self.0.resolve(sym)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LabelPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LabelPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelPool").field("len", &self.len()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Category node with (possibly zero) children
    Nonterminal,
    /// Word form; never has children
    Leaf,
}

/// A node in a constituency tree
#[derive(Debug, Clone)]
pub struct Node {
    pub label: Spur,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Exclusive end of this node's pre-order span
    pub end: NodeId,
}

/// A constituency tree (one sentence)
///
/// Node `0` is the root. Nodes are only ever appended in pre-order, which
/// keeps every subtree a contiguous range of ids.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    pool: LabelPool,
}

impl Tree {
    /// Create an empty tree backed by `pool`
    pub fn new(pool: LabelPool) -> Self {
        Self {
            nodes: Vec::new(),
            pool,
        }
    }

    /// Append a node as the last child of `parent`
    ///
    /// The node's span stays open until [`Tree::close`] is called for it.
    pub(crate) fn push(&mut self, label: &str, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let label = self.pool.get_or_intern(label);
        self.nodes.push(Node {
            label,
            kind,
            parent,
            children: Vec::new(),
            end: id + 1,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id].children.push(id);
        }
        id
    }

    /// Seal the span of `id` after all of its descendants were pushed
    pub(crate) fn close(&mut self, id: NodeId) {
        self.nodes[id].end = self.nodes.len();
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order; a node's id is its index
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn pool(&self) -> &LabelPool {
        &self.pool
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn label(&self, id: NodeId) -> &str {
        self.pool.resolve(&self.nodes[id].label)
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].kind == NodeKind::Leaf
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Ids of `id` and all of its descendants, in pre-order
    #[inline]
    pub fn span(&self, id: NodeId) -> Range<NodeId> {
        id..self.nodes[id].end
    }

    /// Leaf words under `id`, left to right
    pub fn leaves(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.span(id)
            .filter(move |&n| self.is_leaf(n))
            .map(move |n| self.label(n))
    }

    /// One production per nonterminal under `id`, in pre-order
    pub fn productions(&self, id: NodeId) -> Vec<Production> {
        self.span(id)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| Production {
                lhs: self.label(n).to_string(),
                rhs: self
                    .children(n)
                    .iter()
                    .map(|&c| {
                        let label = self.label(c).to_string();
                        if self.is_leaf(c) {
                            Symbol::Terminal(label)
                        } else {
                            Symbol::Nonterminal(label)
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    fn write_bracketed(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf(id) {
            return f.write_str(self.label(id));
        }
        write!(f, "({}", self.label(id))?;
        for &child in self.children(id) {
            f.write_str(" ")?;
            self.write_bracketed(child, f)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("()");
        }
        self.write_bracketed(self.root(), f)
    }
}

/// Right-hand-side symbol of a [`Production`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Nonterminal(String),
    Terminal(String),
}

/// A context-free rule read off one nonterminal and its children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn has_nonterminal(&self, label: &str) -> bool {
        self.rhs
            .iter()
            .any(|s| matches!(s, Symbol::Nonterminal(l) if l == label))
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            match symbol {
                Symbol::Nonterminal(label) => write!(f, " {}", label)?,
                Symbol::Terminal(word) => write!(f, " '{}'", word)?,
            }
        }
        Ok(())
    }
}

/// A view of one node of a shared tree
///
/// This is what queries hand out as matches: cloning it only bumps the
/// tree's reference count.
#[derive(Debug, Clone)]
pub struct Subtree {
    tree: Arc<Tree>,
    node: NodeId,
}

impl Subtree {
    pub fn new(tree: Arc<Tree>, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// View of the whole tree
    pub fn root(tree: Arc<Tree>) -> Self {
        let node = tree.root();
        Self { tree, node }
    }

    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn is_root(&self) -> bool {
        self.node == self.tree.root()
    }

    pub fn label(&self) -> &str {
        self.tree.label(self.node)
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.is_leaf(self.node)
    }

    pub fn children(&self) -> impl Iterator<Item = Subtree> + '_ {
        self.tree
            .children(self.node)
            .iter()
            .map(move |&c| Subtree::new(Arc::clone(&self.tree), c))
    }

    /// Labels of the direct children (words for leaf children)
    pub fn child_labels(&self) -> Vec<&str> {
        self.tree
            .children(self.node)
            .iter()
            .map(|&c| self.tree.label(c))
            .collect()
    }

    pub fn leaves(&self) -> Vec<&str> {
        self.tree.leaves(self.node).collect()
    }

    pub fn productions(&self) -> Vec<Production> {
        self.tree.productions(self.node)
    }
}

impl PartialEq for Subtree {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.node == other.node
    }
}

impl Eq for Subtree {}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.write_bracketed(self.node, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_ran() -> Tree {
        "(S (NP (N cat)) (VP (V ran)))".parse().unwrap()
    }

    #[test]
    fn test_preorder_layout() {
        let tree = cat_ran();

        let labels: Vec<_> = tree.span(tree.root()).map(|n| tree.label(n)).collect();
        assert_eq!(labels, vec!["S", "NP", "N", "cat", "VP", "V", "ran"]);
        assert_eq!(tree.span(1), 1..4);
        assert_eq!(tree.span(4), 4..7);
        assert_eq!(tree.children(0), &[1, 4]);
        assert_eq!(tree.parent(2), Some(1));
        assert!(tree.is_leaf(3));
        assert!(!tree.is_leaf(2));
    }

    #[test]
    fn test_labels_are_shared_through_pool() {
        let pool = LabelPool::new();
        let a = crate::bracket::parse_tree_with("(NP (N dogs))", &pool).unwrap();
        let b = crate::bracket::parse_tree_with("(NP (N cats))", &pool).unwrap();

        assert_eq!(a.node(0).label, b.node(0).label);
        assert_eq!(pool.len(), 4); // NP, N, dogs, cats
    }

    #[test]
    fn test_spans_nest_in_parent_spans() {
        let tree: Tree = "(S (NP (DT the) (NN dog)) (VP (V saw) (NP (PRP it))))".parse().unwrap();

        assert_eq!(tree.nodes().len(), tree.len());
        for (id, node) in tree.nodes().iter().enumerate() {
            let span = tree.span(id);
            assert_eq!(span.end, node.end);
            if let Some(parent) = node.parent {
                let outer = tree.span(parent);
                assert!(outer.start < span.start && span.end <= outer.end);
            }
            // Children tile the span after the node itself
            let mut next = id + 1;
            for &child in &node.children {
                assert_eq!(child, next);
                next = tree.node(child).end;
            }
            assert_eq!(next, node.end);
        }
        assert_eq!(tree.pool().resolve(&tree.node(0).label), "S");
    }

    #[test]
    fn test_leaves_and_display() {
        let tree = cat_ran();

        assert_eq!(tree.leaves(0).collect::<Vec<_>>(), vec!["cat", "ran"]);
        assert_eq!(tree.leaves(4).collect::<Vec<_>>(), vec!["ran"]);
        assert_eq!(tree.to_string(), "(S (NP (N cat)) (VP (V ran)))");
    }

    #[test]
    fn test_productions() {
        let tree: Tree = "(VP (VBD hit) (NP (DT the) (NN ball)))".parse().unwrap();
        let prods = tree.productions(0);

        let rendered: Vec<_> = prods.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "VP -> VBD NP",
                "VBD -> 'hit'",
                "NP -> DT NN",
                "DT -> 'the'",
                "NN -> 'ball'",
            ]
        );
        assert!(prods[0].has_nonterminal("NP"));
        assert!(!prods[0].has_nonterminal("PP"));
    }

    #[test]
    fn test_subtree_view() {
        let tree = Arc::new(cat_ran());
        let vp = Subtree::new(Arc::clone(&tree), 4);

        assert_eq!(vp.label(), "VP");
        assert!(!vp.is_root());
        assert_eq!(vp.child_labels(), vec!["V"]);
        assert_eq!(vp.leaves(), vec!["ran"]);
        assert_eq!(vp.to_string(), "(VP (V ran))");

        let v: Vec<_> = vp.children().collect();
        assert_eq!(v, vec![Subtree::new(Arc::clone(&tree), 5)]);
        assert_eq!(Subtree::root(tree).label(), "S");
    }
}
