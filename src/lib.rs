//! Treesift: structural pattern matching over parse trees
//!
//! Finds constituents by domination chains (`["VP", ["VB.*", "hit.*"], "NP"]`)
//! and sister groups (`["NP", "PP"]`) in Penn-style bracketed treebanks,
//! lazily and one tree at a time.

pub mod bracket; // Bracketed tree reader
pub mod dominance; // Domination and immediate domination
pub mod iterators; // Treebanks and cyclic corpora
pub mod parser; // Textual pattern spec parser
pub mod pattern; // Pattern specs and compiled label matchers
pub mod query; // Lazy queries over a corpus
pub mod scan; // Containment
pub mod searcher; // Per-tree algorithm dispatch
pub mod sister; // General and immediate sisterhood
pub mod tree; // Tree data structures

// Re-exports for convenience
pub use bracket::{ParseError, TreeIterator};
pub use iterators::{Corpus, TreeCursor, TreeSource, Treebank, TreebankError};
pub use parser::parse_spec;
pub use pattern::{LabelPattern, Pattern, PatternSpec, SpecError, compile};
pub use query::Query;
pub use searcher::{Algorithm, UnknownAlgorithm, search, search_spec};
pub use sister::SisterError;
pub use tree::{LabelPool, Node, NodeId, Production, Subtree, Symbol, Tree};
