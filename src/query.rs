//! Lazy queries over a corpus
//!
//! A [`Query`] binds a compiled pattern and an [`Algorithm`] to a
//! [`TreeCursor`] and yields matches one pull at a time. Like the corpus
//! under it, a query is cyclic: it returns `None` once at the end of each
//! pass and starts over on the next pull.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::iterators::TreeCursor;
use crate::pattern::{Pattern, PatternSpec, SpecError, compile};
use crate::searcher::{Algorithm, search};
use crate::tree::{NodeId, Subtree, Tree};

/// A compiled pattern bound to a cursor, an algorithm and a mode
///
/// Unfiltered, each pull yields the root view of the next tree with at
/// least one match. Filtered, each pull yields one matched node, trees
/// taken in corpus order and matches in the order the algorithm reports
/// them.
///
/// The cursor is either owned or borrowed (`Query<&mut Corpus<_>>`); two
/// queries interleaving pulls on one cursor would split its passes, so
/// each query that needs its own pass needs its own cursor.
///
/// # Examples
///
/// ```no_run
/// use treesift::{Algorithm, Corpus, Query, Treebank};
///
/// let corpus = Corpus::new(Treebank::from_glob("wsj/*.mrg").unwrap());
/// let query = Query::from_spec(
///     corpus,
///     r#"["VP", ["VB.*", "hit.*"]]"#,
///     Algorithm::ImmediateDomination,
///     true,
/// )
/// .unwrap();
///
/// for vp in query {
///     println!("{}", vp);
/// }
/// ```
pub struct Query<C: TreeCursor> {
    cursor: C,
    pattern: Pattern,
    algorithm: Algorithm,
    filtered: bool,
    pending: VecDeque<Subtree>,
}

impl<C: TreeCursor> Query<C> {
    pub fn new(cursor: C, pattern: Pattern, algorithm: Algorithm, filtered: bool) -> Self {
        Self {
            cursor,
            pattern,
            algorithm,
            filtered,
            pending: VecDeque::new(),
        }
    }

    /// Compile `spec` and build a query from it
    pub fn compile(
        cursor: C,
        spec: &PatternSpec,
        algorithm: Algorithm,
        filtered: bool,
    ) -> Result<Self, SpecError> {
        Ok(Self::new(cursor, compile(spec)?, algorithm, filtered))
    }

    /// Parse and compile a textual spec such as `["VP", ["VB.*", "hit.*"]]`
    pub fn from_spec(
        cursor: C,
        spec: &str,
        algorithm: Algorithm,
        filtered: bool,
    ) -> Result<Self, SpecError> {
        Ok(Self::new(cursor, Pattern::parse(spec)?, algorithm, filtered))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Matches of this query in a single tree
    pub fn matches(&self, tree: &Tree) -> Vec<NodeId> {
        search(tree, &self.pattern, self.algorithm)
    }

    /// Drop buffered matches and start the next pull from the first tree
    pub fn restart(&mut self) {
        self.pending.clear();
        self.cursor.restart();
    }

    /// Run one full pass from the first tree and count what it yields
    pub fn count_lap(&mut self) -> usize {
        self.restart();
        self.by_ref().count()
    }

    pub fn into_cursor(self) -> C {
        self.cursor
    }
}

impl<C: TreeCursor> Iterator for Query<C> {
    type Item = Subtree;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.pending.pop_front() {
                return Some(found);
            }

            // End of the cursor's pass ends ours
            let tree = self.cursor.next_tree()?;
            let nodes = self.matches(&tree);
            if nodes.is_empty() {
                continue;
            }

            if !self.filtered {
                return Some(Subtree::root(tree));
            }
            self.pending
                .extend(nodes.into_iter().map(|n| Subtree::new(Arc::clone(&tree), n)));
        }
    }
}
