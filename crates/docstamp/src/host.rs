//! Host collaborators: file enumeration, text acquisition and edit
//! application.
//!
//! The orchestrator only talks to the traits defined here. [`FsWorkspace`]
//! is the bundled local-filesystem host; [`PreviewSink`] computes the edited
//! text without writing anything.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::edits::{Edit, EditBatch, apply_to};
use crate::error::{DocError, Result};

/// Source of files and their text.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Files under `root` (or the workspace root) matching `glob`.
    async fn find_files(&self, glob: &str, root: Option<&Path>) -> Result<Vec<PathBuf>>;

    async fn read_text(&self, path: &Path) -> Result<String>;
}

/// Immediate insertion of a single header, as done for a cursor position.
#[async_trait]
pub trait InteractiveSink: Send + Sync {
    /// Inserts `text` at `offset`. Returns `false` when the host rejected the
    /// edit.
    async fn insert(&self, path: &Path, text: &str, offset: u32) -> bool;

    /// Whether inserted text may carry editor snippet placeholders.
    fn supports_snippets(&self) -> bool {
        false
    }
}

/// All-or-nothing application of a batch of insertions.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn apply_all(&self, batch: &EditBatch) -> bool;
}

/// Local filesystem host rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths are taken from the workspace root; absolute paths pass
    /// through unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    async fn rewrite(&self, path: &Path, edits: &[&Edit]) -> std::io::Result<String> {
        let path = self.resolve(path);
        let original = tokio::fs::read_to_string(&path).await?;
        let updated = apply_to(&original, edits);
        tokio::fs::write(&path, updated).await?;
        Ok(original)
    }
}

#[async_trait]
impl Workspace for FsWorkspace {
    async fn find_files(&self, glob: &str, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = root.map_or_else(|| self.root.clone(), |dir| self.resolve(dir));
        let matcher = Glob::new(glob)
            .map_err(|error| DocError::invalid_config(format!("file glob '{glob}': {error}")))?
            .compile_matcher();
        // the walk does blocking directory reads
        let walk_root = root.clone();
        let files = tokio::task::spawn_blocking(move || collect_sources(&walk_root, &matcher))
            .await
            .map_err(|error| DocError::Io {
                path: root.clone(),
                error: std::io::Error::other(error),
            })?;
        debug!(root = %root.display(), count = files.len(), "enumerated source files");
        Ok(files)
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(self.resolve(path))
            .await
            .map_err(|error| DocError::Io {
                path: path.to_path_buf(),
                error,
            })
    }
}

#[async_trait]
impl InteractiveSink for FsWorkspace {
    async fn insert(&self, path: &Path, text: &str, offset: u32) -> bool {
        let edit = Edit {
            path: path.to_path_buf(),
            offset,
            text: text.to_string(),
        };
        match self.rewrite(path, &[&edit]).await {
            Ok(_) => true,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to insert header");
                false
            }
        }
    }
}

#[async_trait]
impl BatchSink for FsWorkspace {
    async fn apply_all(&self, batch: &EditBatch) -> bool {
        let mut written: Vec<(PathBuf, String)> = Vec::new();
        for (path, edits) in batch.by_file() {
            match self.rewrite(path, &edits).await {
                Ok(original) => written.push((self.resolve(path), original)),
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to apply edits, restoring");
                    for (done, original) in written.into_iter().rev() {
                        if let Err(error) = tokio::fs::write(&done, original).await {
                            warn!(path = %done.display(), %error, "failed to restore file");
                        }
                    }
                    return false;
                }
            }
        }
        true
    }
}

/// Walks `root` honouring ignore files, skipping `node_modules` and
/// declaration files. Results are sorted for a stable order.
fn collect_sources(root: &Path, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                debug!(%error, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ty| ty.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| !is_declaration_file(path))
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            matcher.is_match(relative)
        })
        .collect();
    files.sort();
    files
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            [".d.ts", ".d.mts", ".d.cts"]
                .iter()
                .any(|suffix| name.ends_with(suffix))
        })
}

/// Sink that records the edited text of every touched file instead of
/// writing it.
pub struct PreviewSink {
    workspace: Arc<dyn Workspace>,
    snippets: bool,
    results: Mutex<BTreeMap<PathBuf, String>>,
}

impl PreviewSink {
    pub fn new(workspace: Arc<dyn Workspace>) -> Self {
        Self {
            workspace,
            snippets: false,
            results: Mutex::new(BTreeMap::new()),
        }
    }

    /// Makes [`InteractiveSink::supports_snippets`] report `true`.
    pub fn with_snippets(mut self, snippets: bool) -> Self {
        self.snippets = snippets;
        self
    }

    /// Edited text per file, in path order.
    pub fn results(&self) -> BTreeMap<PathBuf, String> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }

    async fn preview(&self, path: &Path, edits: &[&Edit]) -> Option<String> {
        let current = self
            .results
            .lock()
            .ok()
            .and_then(|results| results.get(path).cloned());
        let original = match current {
            Some(text) => text,
            None => match self.workspace.read_text(path).await {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, "cannot preview edits");
                    return None;
                }
            },
        };
        Some(apply_to(&original, edits))
    }

    fn record(&self, updates: Vec<(PathBuf, String)>) -> bool {
        match self.results.lock() {
            Ok(mut results) => {
                results.extend(updates);
                true
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl InteractiveSink for PreviewSink {
    async fn insert(&self, path: &Path, text: &str, offset: u32) -> bool {
        let edit = Edit {
            path: path.to_path_buf(),
            offset,
            text: text.to_string(),
        };
        match self.preview(path, &[&edit]).await {
            Some(updated) => self.record(vec![(path.to_path_buf(), updated)]),
            None => false,
        }
    }

    fn supports_snippets(&self) -> bool {
        self.snippets
    }
}

#[async_trait]
impl BatchSink for PreviewSink {
    async fn apply_all(&self, batch: &EditBatch) -> bool {
        let mut updates = Vec::new();
        for (path, edits) in batch.by_file() {
            let Some(updated) = self.preview(path, &edits).await else {
                return false;
            };
            updates.push((path.to_path_buf(), updated));
        }
        self.record(updates)
    }
}
