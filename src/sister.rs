//! Sisterhood search
//!
//! Finds children of one node that match a list of patterns, either in any
//! order (general sisterhood) or as an adjacent run read forwards or
//! backwards (immediate sisterhood). The first group found in the tree
//! wins; nothing is cached between calls.

use log::trace;
use thiserror::Error;

use crate::pattern::Pattern;
use crate::tree::{NodeId, Tree};

/// Error raised for a candidate site that cannot hold the sister group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SisterError {
    #[error("Sister error: {wanted} patterns but only {available} children")]
    InvalidPermutationSize { wanted: usize, available: usize },
}

/// First sister group under `root` matching `patterns`
///
/// The returned children are in pattern order: the child matched by
/// `patterns[0]` comes first. With `contiguous`, every site is tried
/// forwards before any site is tried in reverse.
pub fn sisters(tree: &Tree, root: NodeId, patterns: &[Pattern], contiguous: bool) -> Vec<NodeId> {
    if patterns.is_empty() {
        return Vec::new();
    }

    let sites = || tree.span(root).filter(|&n| !tree.is_leaf(n));
    let directions: &[bool] = if contiguous { &[false, true] } else { &[false] };

    for &reversed in directions {
        for site in sites() {
            let children = tree.children(site);
            let group = if contiguous {
                adjacent_run(tree, children, patterns, reversed)
            } else {
                any_order(tree, children, patterns)
            };

            match group {
                Ok(Some(found)) => return found,
                Ok(None) => {}
                Err(e) => trace!("Skipping node {} ({}): {}", site, tree.label(site), e),
            }
        }
    }

    Vec::new()
}

fn check_size(available: usize, wanted: usize) -> Result<(), SisterError> {
    if wanted > available {
        return Err(SisterError::InvalidPermutationSize { wanted, available });
    }
    Ok(())
}

/// Distinct children matching each pattern position, in any order
///
/// Candidates are visited in lexicographic permutation order of child
/// indices, so the first group found is the first matching permutation.
fn any_order(
    tree: &Tree,
    children: &[NodeId],
    patterns: &[Pattern],
) -> Result<Option<Vec<NodeId>>, SisterError> {
    check_size(children.len(), patterns.len())?;

    let mut used = vec![false; children.len()];
    let mut picked = Vec::with_capacity(patterns.len());
    let found = assign(tree, children, patterns, &mut used, &mut picked);
    Ok(found.then_some(picked))
}

fn assign(
    tree: &Tree,
    children: &[NodeId],
    patterns: &[Pattern],
    used: &mut [bool],
    picked: &mut Vec<NodeId>,
) -> bool {
    let Some(pattern) = patterns.get(picked.len()) else {
        return true;
    };

    for (i, &child) in children.iter().enumerate() {
        if used[i] || !pattern.is_match(tree.label(child)) {
            continue;
        }
        used[i] = true;
        picked.push(child);
        if assign(tree, children, patterns, used, picked) {
            return true;
        }
        picked.pop();
        used[i] = false;
    }
    false
}

/// First window of adjacent children matching `patterns` position by position
fn adjacent_run(
    tree: &Tree,
    children: &[NodeId],
    patterns: &[Pattern],
    reversed: bool,
) -> Result<Option<Vec<NodeId>>, SisterError> {
    check_size(children.len(), patterns.len())?;

    let fits = |pattern: &Pattern, child: &NodeId| pattern.is_match(tree.label(*child));
    for window in children.windows(patterns.len()) {
        if reversed {
            if patterns.iter().zip(window.iter().rev()).all(|(p, c)| fits(p, c)) {
                return Ok(Some(window.iter().rev().copied().collect()));
            }
        } else if patterns.iter().zip(window).all(|(p, c)| fits(p, c)) {
            return Ok(Some(window.to_vec()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    fn patterns(spec: &str) -> Vec<Pattern> {
        compile(&spec.parse().unwrap()).unwrap().elements().to_vec()
    }

    /// 0 PP, 1 IN, 2 with, 3 NP, 4 N, 5 a, 6 N, 7 hammer
    fn with_hammer() -> Tree {
        "(PP (IN with) (NP (N a) (N hammer)))".parse().unwrap()
    }

    #[test]
    fn test_general_sisterhood_ignores_order() {
        let tree = with_hammer();

        assert_eq!(sisters(&tree, 0, &patterns(r#"["IN", "NP"]"#), false), vec![1, 3]);
        assert_eq!(sisters(&tree, 0, &patterns(r#"["NP", "IN"]"#), false), vec![3, 1]);
    }

    #[test]
    fn test_immediate_sisterhood_reads_both_directions() {
        let tree = with_hammer();

        assert_eq!(sisters(&tree, 0, &patterns(r#"["IN", "NP"]"#), true), vec![1, 3]);
        assert_eq!(sisters(&tree, 0, &patterns(r#"["NP", "IN"]"#), true), vec![3, 1]);
    }

    #[test]
    fn test_immediate_sisterhood_requires_adjacency() {
        // 0 VP, 1 V, 2 hit, 3 NP, 4 it, 5 PP, 6 IN, 7 with
        let tree: Tree = "(VP (V hit) (NP it) (PP (IN with)))".parse().unwrap();

        assert_eq!(sisters(&tree, 0, &patterns(r#"["PP", "V"]"#), false), vec![5, 1]);
        assert!(sisters(&tree, 0, &patterns(r#"["PP", "V"]"#), true).is_empty());
        assert_eq!(sisters(&tree, 0, &patterns(r#"["NP", "PP"]"#), true), vec![3, 5]);
    }

    #[test]
    fn test_forward_runs_before_reversed_runs() {
        // 0 S, 1 P, 2 b, 3 q, 4 a, 5 q, 6 R, 7 a, 8 q, 9 b, 10 q
        let tree: Tree = "(S (P (b q) (a q)) (R (a q) (b q)))".parse().unwrap();
        let ab = patterns(r#"["a", "b"]"#);

        assert_eq!(sisters(&tree, 0, &ab, true), vec![7, 9]);
        // General sisterhood takes the first site in pre-order
        assert_eq!(sisters(&tree, 0, &ab, false), vec![4, 2]);

        let tree: Tree = "(S (P (b q) (a q)) (R (c q)))".parse().unwrap();
        assert_eq!(sisters(&tree, 0, &ab, true), vec![4, 2]);
    }

    #[test]
    fn test_children_used_once() {
        // 0 NP, 1 N, 2 x, 3 DT, 4 y
        let tree: Tree = "(NP (N x) (DT y))".parse().unwrap();

        assert!(sisters(&tree, 0, &patterns(r#"["N", "N"]"#), false).is_empty());
        assert_eq!(sisters(&tree, 0, &patterns(r#"["N|DT", "N"]"#), false), vec![3, 1]);
    }

    #[test]
    fn test_sites_too_small_are_skipped() {
        let tree = with_hammer();
        let three = patterns(r#"["IN", "NP", "N"]"#);

        assert!(sisters(&tree, 0, &three, false).is_empty());
        assert_eq!(
            any_order(&tree, tree.children(0), &three),
            Err(SisterError::InvalidPermutationSize {
                wanted: 3,
                available: 2
            })
        );
        assert!(adjacent_run(&tree, tree.children(1), &three, false).is_err());
    }

    #[test]
    fn test_no_patterns_no_match() {
        let tree = with_hammer();
        assert!(sisters(&tree, 0, &[], false).is_empty());
        assert!(sisters(&tree, 0, &[], true).is_empty());
    }
}
