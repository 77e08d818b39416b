//! Domination chains
//!
//! A chain `[A, B, C]` finds every `A` that dominates a `B` that dominates
//! a `C`, and reports the `A`s. A nested list in the chain is a side
//! condition: `[VP, [PP, IN], NP]` keeps a `VP` only if a `PP` with an `IN`
//! hangs below it, then continues looking for the `NP` from the `VP`.
//!
//! Candidates carry the index of the head match they descend from. Steps
//! replace a candidate's current node but never its origin, so every result
//! is attributed to exactly one head match.

use std::slice;

use crate::pattern::Pattern;
use crate::scan::{children_matching, scan};
use crate::tree::{NodeId, Tree};

/// How far below the current node a chain step may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Anywhere in the current subtree, the current node included
    Dominates,
    /// Direct children only
    ImmediatelyDominates,
}

impl Relation {
    /// Nodes reachable from `from` whose label matches `pattern`
    fn step(self, tree: &Tree, from: NodeId, pattern: &Pattern) -> Vec<NodeId> {
        match self {
            Relation::Dominates => scan(tree, from, slice::from_ref(pattern)),
            Relation::ImmediatelyDominates => children_matching(tree, from, pattern),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Index into the head matches
    origin: usize,
    at: NodeId,
}

/// Head matches under `root` for which the whole chain can be satisfied
///
/// The head is located anywhere under `root`; `relation` governs every
/// later step. Results are in head-match order, without duplicates.
pub fn dominate(tree: &Tree, root: NodeId, chain: &[Pattern], relation: Relation) -> Vec<NodeId> {
    let Some((head, steps)) = chain.split_first() else {
        return Vec::new();
    };
    let starts = scan(tree, root, slice::from_ref(head));
    follow(tree, starts, steps, relation)
}

fn follow(tree: &Tree, starts: Vec<NodeId>, steps: &[Pattern], relation: Relation) -> Vec<NodeId> {
    let mut generation: Vec<Candidate> = starts
        .iter()
        .enumerate()
        .map(|(origin, &at)| Candidate { origin, at })
        .collect();

    for step in steps {
        if generation.is_empty() {
            return Vec::new();
        }

        generation = match step {
            Pattern::Label(_) => generation
                .iter()
                .flat_map(|c| {
                    let origin = c.origin;
                    relation
                        .step(tree, c.at, step)
                        .into_iter()
                        .map(move |at| Candidate { origin, at })
                })
                .collect(),
            Pattern::Chain(branch) => generation
                .into_iter()
                .filter(|c| holds(tree, c.at, branch, relation))
                .collect(),
        };
    }

    let mut alive = vec![false; starts.len()];
    for candidate in &generation {
        alive[candidate.origin] = true;
    }
    starts
        .into_iter()
        .zip(alive)
        .filter_map(|(node, alive)| alive.then_some(node))
        .collect()
}

/// Whether a side-condition chain is satisfied starting from `at`
///
/// The branch head is found from `at` with the same relation as any other
/// step. An empty branch always holds.
fn holds(tree: &Tree, at: NodeId, branch: &[Pattern], relation: Relation) -> bool {
    let Some((head, steps)) = branch.split_first() else {
        return true;
    };
    let starts = relation.step(tree, at, head);
    !starts.is_empty() && !follow(tree, starts, steps, relation).is_empty()
}
