//! Bracketed tree parsing
//!
//! Parses Penn-style bracketed files into Tree structures. Input is split
//! into top-level blocks by balanced parentheses, and each block is parsed
//! on its own, so text between trees is ignored and a malformed tree only
//! costs that one block.
//!
//! Files ending in `.gz` are decompressed on the fly.

use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use memchr::{memchr, memchr2};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::tree::{LabelPool, NodeId, NodeKind, Tree};

#[derive(Parser)]
#[grammar = "tree.pest"]
struct BracketParser;

/// Error during bracketed tree parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based position of the tree within its input
    pub block: usize,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error in tree {}: {}", self.block, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a single bracketed tree, interning labels into `pool`
pub fn parse_tree_with(text: &str, pool: &LabelPool) -> Result<Tree, ParseError> {
    parse_block(text, pool, 1)
}

impl FromStr for Tree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tree_with(s, &LabelPool::new())
    }
}

fn parse_block(text: &str, pool: &LabelPool, block: usize) -> Result<Tree, ParseError> {
    let mut pairs = BracketParser::parse(Rule::tree, text).map_err(|e| ParseError {
        block,
        message: e.to_string(),
    })?;

    let Some(node) = pairs.next().and_then(|p| p.into_inner().next()) else {
        return Err(ParseError {
            block,
            message: "Expected a bracketed node".to_string(),
        });
    };

    let mut tree = Tree::new(pool.clone());
    build_node(strip_empty_root(node), None, &mut tree);
    Ok(tree)
}

/// `( (S ...) )` wraps the real tree in an unlabeled unary node; drop it
fn strip_empty_root(node: Pair<'_, Rule>) -> Pair<'_, Rule> {
    let inner: Vec<_> = node.clone().into_inner().collect();
    match inner.as_slice() {
        [only] if only.as_rule() == Rule::node => only.clone(),
        _ => node,
    }
}

fn build_node(pair: Pair<'_, Rule>, parent: Option<NodeId>, tree: &mut Tree) {
    let mut label = "";
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::label => label = inner.as_str(),
            _ => children.push(inner),
        }
    }

    let id = tree.push(label, NodeKind::Nonterminal, parent);
    for child in children {
        match child.as_rule() {
            Rule::node => build_node(child, Some(id), tree),
            Rule::word => {
                tree.push(child.as_str(), NodeKind::Leaf, Some(id));
            }
            _ => {}
        }
    }
    tree.close(id);
}

/// Reader that iterates over the trees of one bracketed input
pub struct TreeIterator {
    reader: Box<dyn BufRead>,
    pool: LabelPool,
    block: Vec<u8>,
    block_num: usize,
    done: bool,
}

impl TreeIterator {
    pub fn new(reader: Box<dyn BufRead>, pool: LabelPool) -> Self {
        Self {
            reader,
            pool,
            block: Vec::new(),
            block_num: 0,
            done: false,
        }
    }

    /// Create a reader from a string
    ///
    /// An `Arc<str>` is read in place, so repeated passes over the same
    /// in-memory text share one buffer.
    pub fn from_string(text: impl Into<Arc<str>>, pool: LabelPool) -> Self {
        let text: Arc<str> = text.into();
        let cursor = Cursor::new(Arc::<[u8]>::from(text));
        Self::new(Box::new(cursor), pool)
    }

    /// Create a reader from a file path; `.gz` files are decompressed
    pub fn from_file(path: &Path, pool: LabelPool) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader, pool))
    }

    /// Read bytes up to and including the next balanced top-level bracket
    ///
    /// Returns `None` at EOF. An unterminated final block is returned as-is
    /// and fails later, in the parser.
    fn next_block(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.block.clear();
        let mut depth = 0usize;

        loop {
            let (consumed, finished) = 'scan: {
                let chunk = self.reader.fill_buf()?;
                if chunk.is_empty() {
                    if self.block.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(std::mem::take(&mut self.block)));
                }

                let mut pos = 0;
                if depth == 0 {
                    match memchr(b'(', chunk) {
                        Some(i) => pos = i,
                        None => break 'scan (chunk.len(), false),
                    }
                }
                let start = pos;

                let mut finished = false;
                while let Some(offset) = memchr2(b'(', b')', &chunk[pos..]) {
                    let i = pos + offset;
                    if chunk[i] == b'(' {
                        depth += 1;
                    } else {
                        depth -= 1;
                    }
                    pos = i + 1;
                    if depth == 0 {
                        finished = true;
                        break;
                    }
                }

                let end = if finished { pos } else { chunk.len() };
                self.block.extend_from_slice(&chunk[start..end]);
                (end, finished)
            };

            self.reader.consume(consumed);
            if finished {
                return Ok(Some(std::mem::take(&mut self.block)));
            }
        }
    }
}

impl Iterator for TreeIterator {
    type Item = Result<Tree, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bytes = match self.next_block() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(ParseError {
                    block: self.block_num + 1,
                    message: format!("IO error: {}", e),
                }));
            }
        };

        self.block_num += 1;
        let result = match bytes.to_str() {
            Ok(text) => parse_block(text, &self.pool, self.block_num),
            Err(e) => Err(ParseError {
                block: self.block_num,
                message: format!("Invalid UTF-8: {}", e),
            }),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TREES: &str = "
( (S (NP (DT The) (NN dog)) (VP (VBZ runs)) (. .)) )

(S (NP (NNS Cats)) (VP (VBP sleep)))
";

    #[test]
    fn test_parse_simple_tree() {
        let tree: Tree = "(S (NP (N cat)) (VP (V ran)))".parse().unwrap();

        assert_eq!(tree.len(), 7);
        assert_eq!(tree.label(0), "S");
        assert_eq!(tree.children(0).len(), 2);
        assert!(tree.is_leaf(3));
        assert_eq!(tree.label(3), "cat");
    }

    #[test]
    fn test_strips_unlabeled_wrapper() {
        let tree: Tree = "( (S (NP (N cat))) )".parse().unwrap();
        assert_eq!(tree.label(0), "S");
        assert_eq!(tree.parent(0), None);

        // Kept when it wraps more than one constituent
        let tree: Tree = "( (NP (N a)) (VP (V b)) )".parse().unwrap();
        assert_eq!(tree.label(0), "");
        assert_eq!(tree.children(0).len(), 2);
    }

    #[test]
    fn test_parse_rejects_unbalanced() {
        assert!("(S (NP (N cat))".parse::<Tree>().is_err());
        assert!("(S (NP cat)) (VP)".parse::<Tree>().is_err());
        assert!("".parse::<Tree>().is_err());
    }

    #[test]
    fn test_iterator_from_string() {
        let trees: Vec<_> = TreeIterator::from_string(TWO_TREES, LabelPool::new())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].to_string(), "(S (NP (DT The) (NN dog)) (VP (VBZ runs)) (. .))");
        assert_eq!(trees[1].leaves(0).collect::<Vec<_>>(), vec!["Cats", "sleep"]);
    }

    #[test]
    fn test_iterator_reports_bad_block_and_continues() {
        let mut bytes = b"(S (NP (N a))) (S (N \xff)) (S (V c)) ".to_vec();
        bytes.extend_from_slice(b"(S (NP (N b))");
        let results: Vec<_> =
            TreeIterator::new(Box::new(Cursor::new(bytes)), LabelPool::new()).collect();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err().block, 2);
        assert_eq!(results[2].as_ref().unwrap().label(0), "S");
        // Unterminated final tree
        assert_eq!(results[3].as_ref().unwrap_err().block, 4);
    }

    #[test]
    fn test_iterator_skips_text_between_trees() {
        let text = "*x* header line\n(A (B c))\n-- separator --\n(D e)";
        let trees: Vec<_> = TreeIterator::from_string(text, LabelPool::new())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].to_string(), "(D e)");
    }

    #[test]
    fn test_iterator_small_buffer() {
        // Blocks straddling buffer boundaries are reassembled
        let reader = BufReader::with_capacity(4, Cursor::new(TWO_TREES.as_bytes().to_vec()));
        let trees: Vec<_> = TreeIterator::new(Box::new(reader), LabelPool::new())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].label(0), "S");
    }
}
