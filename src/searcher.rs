//! Per-tree search
//!
//! Dispatches a compiled pattern to one of the search algorithms and
//! returns the matching node ids of a single tree.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::dominance::{Relation, dominate};
use crate::pattern::{Pattern, SpecError};
use crate::scan::scan;
use crate::sister::sisters;
use crate::tree::{NodeId, Tree};

/// Search algorithm a query runs on each tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Nodes whose label matches any pattern of the list
    Containment,
    /// Heads of a chain where each step is dominated by the previous one
    Domination,
    /// Like `Domination`, with each step a direct child
    ImmediateDomination,
    /// Children of one node matching the list in any order
    Sister,
    /// Adjacent children matching the list forwards or backwards
    ImmediateSister,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Containment,
        Algorithm::Domination,
        Algorithm::ImmediateDomination,
        Algorithm::Sister,
        Algorithm::ImmediateSister,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Containment => "containment",
            Algorithm::Domination => "domination",
            Algorithm::ImmediateDomination => "immediate-domination",
            Algorithm::Sister => "sister",
            Algorithm::ImmediateSister => "immediate-sister",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Search a tree with a pre-compiled pattern
///
/// Returns the matching node ids; an empty result means no match.
pub fn search(tree: &Tree, pattern: &Pattern, algorithm: Algorithm) -> Vec<NodeId> {
    if tree.is_empty() {
        return Vec::new();
    }

    let root = tree.root();
    let elements = pattern.elements();
    match algorithm {
        Algorithm::Containment => scan(tree, root, elements),
        Algorithm::Domination => dominate(tree, root, elements, Relation::Dominates),
        Algorithm::ImmediateDomination => {
            dominate(tree, root, elements, Relation::ImmediatelyDominates)
        }
        Algorithm::Sister => sisters(tree, root, elements, false),
        Algorithm::ImmediateSister => sisters(tree, root, elements, true),
    }
}

/// Search a tree with a textual spec
///
/// Parses and compiles `spec` and then searches the tree.
pub fn search_spec(
    tree: &Tree,
    spec: &str,
    algorithm: Algorithm,
) -> Result<Vec<NodeId>, SpecError> {
    let pattern = Pattern::parse(spec)?;
    Ok(search(tree, &pattern, algorithm))
}
