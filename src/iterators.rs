//! Iterators for trees
//!
//! Provides:
//! - [`Treebank`]: bracketed trees from a string, file, or glob pattern
//! - [`TreeSource`]: anything that can start a fresh pass over trees
//! - [`Corpus`]: a cyclic cursor over a source, the input of a query

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::bracket::{ParseError, TreeIterator};
use crate::tree::{LabelPool, Tree};

/// Error while reading a treebank
#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Failed to open file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A restartable provider of trees
pub trait TreeSource {
    /// Start a fresh pass over all trees
    fn open(&self) -> Box<dyn Iterator<Item = Arc<Tree>>>;
}

/// Source of trees for a treebank
#[derive(Debug, Clone)]
enum Source {
    /// In-memory bracketed text
    String(Arc<str>),
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

/// Collection of bracketed trees from a string, file, or glob pattern
///
/// Every pass re-reads the input. Errors (file open, parse errors) are
/// logged as warnings and skipped; use [`Treebank::try_iter`] to see them.
///
/// # Examples
///
/// ```no_run
/// use treesift::Treebank;
///
/// let trees = Treebank::from_glob("wsj/*.mrg").unwrap();
/// for tree in trees.iter() {
///     println!("{}", tree);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    source: Source,
    pool: LabelPool,
}

impl Treebank {
    /// Create from in-memory bracketed text
    pub fn from_string(text: &str) -> Self {
        Self::with_source(Source::String(Arc::from(text)))
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self::with_source(Source::File(path.as_ref().to_path_buf()))
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, TreebankError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        Ok(Self::from_paths(file_paths))
    }

    /// Create from explicit file paths
    pub fn from_paths(file_paths: Vec<PathBuf>) -> Self {
        Self::with_source(Source::Files(file_paths))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            pool: LabelPool::new(),
        }
    }

    /// Label pool shared by every tree this treebank reads
    pub fn pool(&self) -> &LabelPool {
        &self.pool
    }

    /// Iterate over trees, reporting unreadable files and malformed trees
    pub fn try_iter(&self) -> Box<dyn Iterator<Item = Result<Arc<Tree>, TreebankError>>> {
        let pool = self.pool.clone();
        match &self.source {
            Source::String(text) => Box::new(
                TreeIterator::from_string(Arc::clone(text), pool)
                    .map(|r| r.map(Arc::new).map_err(TreebankError::from)),
            ),
            Source::File(path) => file_trees(path.clone(), pool),
            Source::Files(paths) => Box::new(
                paths
                    .clone()
                    .into_iter()
                    .flat_map(move |path| file_trees(path, pool.clone())),
            ),
        }
    }

    /// Iterate over trees, skipping what cannot be read
    pub fn iter(&self) -> Box<dyn Iterator<Item = Arc<Tree>>> {
        Box::new(self.try_iter().filter_map(|result| match result {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!("Skipping unreadable input: {}", e);
                None
            }
        }))
    }
}

impl IntoIterator for Treebank {
    type Item = Arc<Tree>;
    type IntoIter = Box<dyn Iterator<Item = Self::Item>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TreeSource for Treebank {
    fn open(&self) -> Box<dyn Iterator<Item = Arc<Tree>>> {
        self.iter()
    }
}

impl TreeSource for Vec<Arc<Tree>> {
    fn open(&self) -> Box<dyn Iterator<Item = Arc<Tree>>> {
        Box::new(self.clone().into_iter())
    }
}

/// Helper: Open a file and return an iterator over its trees
///
/// A file that cannot be opened yields a single error.
fn file_trees(
    path: PathBuf,
    pool: LabelPool,
) -> Box<dyn Iterator<Item = Result<Arc<Tree>, TreebankError>>> {
    match TreeIterator::from_file(&path, pool) {
        Ok(reader) => Box::new(reader.map(|r| r.map(Arc::new).map_err(TreebankError::from))),
        Err(source) => Box::new(std::iter::once(Err(TreebankError::FileOpen { path, source }))),
    }
}

/// Pull-one-tree interface queries consume
///
/// `next_tree` returns `None` once at the end of each pass; the pull after
/// that starts the next pass from the first tree.
pub trait TreeCursor {
    fn next_tree(&mut self) -> Option<Arc<Tree>>;

    /// Abandon the current pass; the next pull starts from the first tree
    fn restart(&mut self);
}

impl<T: TreeCursor + ?Sized> TreeCursor for &mut T {
    fn next_tree(&mut self) -> Option<Arc<Tree>> {
        (**self).next_tree()
    }

    fn restart(&mut self) {
        (**self).restart()
    }
}

/// Cyclic cursor over a [`TreeSource`]
///
/// Iterating yields one pass and then `None`; iterating again starts over,
/// so `for tree in &mut corpus` always walks exactly one pass. Only one
/// pass is open at a time and no trees are buffered.
pub struct Corpus<S: TreeSource> {
    source: S,
    pass: Option<Box<dyn Iterator<Item = Arc<Tree>>>>,
    laps: usize,
}

impl<S: TreeSource> Corpus<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pass: None,
            laps: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of passes completed so far
    pub fn laps(&self) -> usize {
        self.laps
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: TreeSource> TreeCursor for Corpus<S> {
    fn next_tree(&mut self) -> Option<Arc<Tree>> {
        let source = &self.source;
        let pass = self.pass.get_or_insert_with(|| source.open());
        match pass.next() {
            Some(tree) => Some(tree),
            None => {
                self.pass = None;
                self.laps += 1;
                debug!("Corpus pass {} finished", self.laps);
                None
            }
        }
    }

    fn restart(&mut self) {
        if self.pass.take().is_some() {
            debug!("Corpus restarted mid-pass");
        }
    }
}

impl<S: TreeSource> Iterator for Corpus<S> {
    type Item = Arc<Tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tree()
    }
}

impl From<Treebank> for Corpus<Treebank> {
    fn from(treebank: Treebank) -> Self {
        Corpus::new(treebank)
    }
}
