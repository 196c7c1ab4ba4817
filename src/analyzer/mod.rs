//! Analysis engine
//!
//! `Analyzer` owns the caches, the parser and the configured root. Every
//! query operation goes through it:
//!
//! - `initialize_engine` / `initialize_custom` - set the root and warm caches
//! - `analyze_class` - cache hit or batched scan until the class shows up
//! - `find_class_hierarchy` - recursive superclass resolution
//! - `find_references` / `search_code` - structural and text search
//! - `analyze_subsystem`, `query_api_reference`, `detect_patterns`
//!
//! @module analyzer

mod hierarchy;
mod insight;
mod search;

pub use search::SearchOptions;

use crate::cache::CacheStore;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::extract::{class_query_source, extract_classes, ClassInfo};
use crate::parse::{CppParser, FileWalker, Language, TreeParser};
use crate::scan::BatchScanner;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tree_sitter::{Query, Tree};

const CLASS_QUERY_KEY: &str = "class";

/// What kind of root the analyzer was initialized with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Engine,
    Custom,
}

#[derive(Debug, Clone)]
struct Workspace {
    root: PathBuf,
    kind: RootKind,
}

/// Result of an initialization call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitSummary {
    pub root: PathBuf,
    pub kind: RootKind,
    pub files_scanned: usize,
    pub classes_found: usize,
}

pub struct Analyzer {
    config: Config,
    caches: CacheStore,
    parser: Arc<dyn TreeParser>,
    workspace: RwLock<Option<Workspace>>,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self::with_parser(config, Arc::new(CppParser))
    }

    /// Use a custom parser (e.g. an instrumented one)
    pub fn with_parser(config: Config, parser: Arc<dyn TreeParser>) -> Self {
        Self {
            caches: CacheStore::new(config.cache.capacity),
            config,
            parser,
            workspace: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caches(&self) -> &CacheStore {
        &self.caches
    }

    pub fn is_initialized(&self) -> bool {
        self.workspace.read().is_some()
    }

    /// Configured root, if initialized
    pub fn root(&self) -> Option<PathBuf> {
        self.workspace.read().as_ref().map(|w| w.root.clone())
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Set an engine checkout as the root and scan the default engine modules.
    ///
    /// The root is recorded before the warm-up scan, so a failing scan still
    /// leaves the analyzer initialized.
    pub async fn initialize_engine(&self, path: impl AsRef<Path>) -> Result<InitSummary> {
        let root = existing_dir(path.as_ref()).await?;

        let required = root.join(&self.config.engine.required_subdir);
        if !required.is_dir() {
            return Err(Error::InvalidPath { path: required });
        }

        self.set_workspace(&root, RootKind::Engine);

        let mut files = Vec::new();
        for dir in &self.config.engine.default_scan_dirs {
            let dir = root.join(dir);
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "Default scan directory missing, skipping");
                continue;
            }
            files.extend(self.walker(&dir).walk(&self.config.scan.engine_class_pattern)?);
        }

        self.warm(root, RootKind::Engine, files).await
    }

    /// Set an arbitrary codebase as the root and scan all of it
    pub async fn initialize_custom(&self, path: impl AsRef<Path>) -> Result<InitSummary> {
        let root = existing_dir(path.as_ref()).await?;
        self.set_workspace(&root, RootKind::Custom);

        let files = self
            .walker(&root)
            .walk(&self.config.scan.custom_class_pattern)?;
        self.warm(root, RootKind::Custom, files).await
    }

    fn set_workspace(&self, root: &Path, kind: RootKind) {
        info!(root = %root.display(), kind = ?kind, "Analyzer root set");
        *self.workspace.write() = Some(Workspace {
            root: root.to_path_buf(),
            kind,
        });
    }

    async fn warm(&self, root: PathBuf, kind: RootKind, files: Vec<PathBuf>) -> Result<InitSummary> {
        let classes = self
            .structural_scanner()
            .scan(&files, |path| self.extract_file(path))
            .await?;
        let classes_found = classes.iter().map(Vec::len).sum();

        info!(
            files = files.len(),
            classes = classes_found,
            "Initial scan complete"
        );

        Ok(InitSummary {
            root,
            kind,
            files_scanned: files.len(),
            classes_found,
        })
    }

    // =========================================================================
    // CLASS LOOKUP
    // =========================================================================

    /// Extracted info for a class, scanning the root if it is not cached.
    ///
    /// The scan stops after the first batch that yields the class.
    pub async fn analyze_class(&self, class_name: &str) -> Result<ClassInfo> {
        let workspace = self.workspace()?;

        if let Some(class) = self.caches.classes.get(class_name) {
            debug!(class = class_name, "Class cache hit");
            return Ok(class);
        }

        let files = self.class_files(&workspace)?;
        let scanned = self
            .structural_scanner()
            .scan_until(
                &files,
                |path| self.extract_file(path),
                |batch| batch.iter().flatten().any(|c| c.name == class_name),
            )
            .await?;

        scanned
            .into_iter()
            .flatten()
            .filter(|c| c.name == class_name)
            .last()
            .ok_or_else(|| Error::ClassNotFound {
                name: class_name.to_string(),
            })
    }

    // =========================================================================
    // SHARED PLUMBING
    // =========================================================================

    fn workspace(&self) -> Result<Workspace> {
        self.workspace.read().clone().ok_or(Error::NotInitialized)
    }

    fn walker(&self, root: &Path) -> FileWalker {
        FileWalker::new(root).with_max_file_size(self.config.scan.max_file_size)
    }

    fn class_files(&self, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        let pattern = match workspace.kind {
            RootKind::Engine => &self.config.scan.engine_class_pattern,
            RootKind::Custom => &self.config.scan.custom_class_pattern,
        };
        self.walker(&workspace.root).walk(pattern)
    }

    fn structural_scanner(&self) -> BatchScanner {
        BatchScanner::new(self.config.scan.structural_batch_size)
    }

    fn text_scanner(&self) -> BatchScanner {
        BatchScanner::new(self.config.scan.text_batch_size)
    }

    /// Read, parse and extract one file, caching every class found
    async fn extract_file(&self, path: PathBuf) -> Result<Vec<ClassInfo>> {
        if !Language::from_path(&path).has_ast_support() {
            return Ok(Vec::new());
        }

        let source = read_source(&path).await?;
        let tree = self.tree_for(&path, &source)?;
        let query = self.query_for(CLASS_QUERY_KEY, class_query_source)?;

        let classes = extract_classes(&tree, &query, &source, &path);
        for class in &classes {
            self.caches.classes.put(class.name.clone(), class.clone());
        }

        debug!(path = %path.display(), classes = classes.len(), "Extracted file");
        Ok(classes)
    }

    /// Cached tree for a file, reparsed only when absent or structurally
    /// broken. A cached tree whose extent no longer matches the source
    /// length is stale and also reparsed.
    fn tree_for(&self, path: &Path, source: &str) -> Result<Tree> {
        if let Some(tree) = self.caches.trees.get(path) {
            let root = tree.root_node();
            if !root.has_error() && root.end_byte() == source.len() {
                return Ok(tree);
            }
            debug!(path = %path.display(), "Reparsing cached tree");
        }

        let tree = self
            .parser
            .parse(source)
            .map_err(|e| Error::batch_io(path, e))?;
        self.caches.trees.put(path.to_path_buf(), tree.clone());
        Ok(tree)
    }

    /// Compiled query under `key`, compiled from `source` on first use
    fn query_for<S, F>(&self, key: &str, source: F) -> Result<Arc<Query>>
    where
        S: AsRef<str>,
        F: FnOnce() -> S,
    {
        self.caches.queries.get_or_try_insert(key.to_string(), || {
            Query::new(&self.parser.language(), source().as_ref())
                .map(Arc::new)
                .map_err(|e| Error::QueryError {
                    message: format!("{}: {}", key, e),
                })
        })
    }
}

async fn existing_dir(path: &Path) -> Result<PathBuf> {
    let root = tokio::fs::canonicalize(path)
        .await
        .map_err(|_| Error::InvalidPath {
            path: path.to_path_buf(),
        })?;

    if !root.is_dir() {
        return Err(Error::InvalidPath { path: root });
    }
    Ok(root)
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::batch_io(path, e))
}
