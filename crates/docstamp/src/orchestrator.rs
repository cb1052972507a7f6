//! Scope traversal and header insertion.
//!
//! [`Orchestrator::run`] resolves a [`GenerationScope`] to declarations,
//! builds their headers and hands the rendered text to the host sinks.
//! Declarations inside one file are visited by descending anchor offset so
//! every insertion refers to untouched text. File, folder and workspace
//! scopes collect insertions into one [`EditBatch`] applied once at the end,
//! and never apply anything after cancellation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::HeaderBuilder;
use crate::classify::{ClassifyOptions, classify_position, file_declarations};
use crate::edits::EditBatch;
use crate::error::{DocError, Result};
use crate::host::{BatchSink, InteractiveSink, Workspace};
use crate::line_index::{LineIndex, SourceLocation};
use crate::parser::SourceParser;
use crate::render::{RenderMode, render};

/// Location inside a file, either as a byte offset or a line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Offset(u32),
    Location(SourceLocation),
}

/// What a single invocation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationScope {
    /// The declaration at a cursor position.
    Position { path: PathBuf, cursor: Cursor },
    /// Every undocumented declaration of one file.
    File(PathBuf),
    /// Every matching file below a directory.
    Folder(PathBuf),
    /// Every matching file of the workspace, optionally below another root.
    Workspace(Option<PathBuf>),
}

impl GenerationScope {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Position { .. } => "position",
            Self::File(_) => "file",
            Self::Folder(_) => "folder",
            Self::Workspace(_) => "workspace",
        }
    }
}

impl fmt::Display for GenerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position { path, cursor } => match cursor {
                Cursor::Offset(offset) => write!(f, "{}@{offset}", path.display()),
                Cursor::Location(location) => write!(
                    f,
                    "{}:{}:{}",
                    path.display(),
                    location.line,
                    location.column
                ),
            },
            Self::File(path) | Self::Folder(path) => write!(f, "{}", path.display()),
            Self::Workspace(Some(root)) => write!(f, "{}", root.display()),
            Self::Workspace(None) => f.write_str("workspace"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Headers were generated and the host accepted the edits.
    Applied,
    /// Nothing in scope needed a header.
    NothingToGenerate,
    /// The declaration at the cursor already has a header.
    AlreadyDocumented,
    /// The run was cancelled; no batched edits were applied.
    Cancelled,
    /// The host rejected the edits.
    InsertionFailed,
}

/// A file skipped during a folder or workspace run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub scope: GenerationScope,
    /// Headers generated, even when they were not applied.
    pub generated: usize,
    pub outcome: Outcome,
    pub skipped_files: Vec<SkippedFile>,
}

impl GenerationReport {
    fn new(scope: GenerationScope, generated: usize, outcome: Outcome) -> Self {
        Self {
            scope,
            generated,
            outcome,
            skipped_files: Vec::new(),
        }
    }
}

/// Progress notifications. One unit is a declaration in file scope and a
/// file in folder and workspace scope.
pub trait ProgressSink: Send + Sync {
    fn start(&self, _total: usize) {}

    fn advance(&self, _item: &str) {}

    fn finish(&self) {}
}

/// Progress sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Per-file result inside a larger scope.
struct FilePass {
    generated: usize,
    cancelled: bool,
}

/// Drives header generation over one scope.
pub struct Orchestrator {
    builder: Arc<HeaderBuilder>,
    parser: Arc<dyn SourceParser>,
    workspace: Arc<dyn Workspace>,
    interactive: Arc<dyn InteractiveSink>,
    batch: Arc<dyn BatchSink>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator whose host serves files and applies edits.
    pub fn new<H>(builder: Arc<HeaderBuilder>, parser: Arc<dyn SourceParser>, host: Arc<H>) -> Self
    where
        H: Workspace + InteractiveSink + BatchSink + 'static,
    {
        Self {
            builder,
            parser,
            workspace: host.clone(),
            interactive: host.clone(),
            batch: host,
            progress: Arc::new(NoProgress),
            cancel: CancellationToken::new(),
        }
    }

    /// Routes edits to other sinks while still reading from the same host.
    pub fn with_sinks(
        mut self,
        interactive: Arc<dyn InteractiveSink>,
        batch: Arc<dyn BatchSink>,
    ) -> Self {
        self.interactive = interactive;
        self.batch = batch;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, scope: GenerationScope) -> Result<GenerationReport> {
        info!(scope = scope.name(), target = %scope, "generating headers");
        let report = match &scope {
            GenerationScope::Position { path, cursor } => {
                self.run_position(scope.clone(), path, *cursor).await?
            }
            GenerationScope::File(path) => self.run_file(scope.clone(), path).await?,
            GenerationScope::Folder(dir) => self.run_tree(scope.clone(), Some(dir)).await?,
            GenerationScope::Workspace(root) => {
                self.run_tree(scope.clone(), root.as_deref()).await?
            }
        };
        info!(
            scope = report.scope.name(),
            generated = report.generated,
            outcome = ?report.outcome,
            skipped = report.skipped_files.len(),
            "generation finished"
        );
        Ok(report)
    }

    async fn run_position(
        &self,
        scope: GenerationScope,
        path: &Path,
        cursor: Cursor,
    ) -> Result<GenerationReport> {
        let text = self.read_source(path).await?;
        if self.cancel.is_cancelled() {
            return Ok(GenerationReport::new(scope, 0, Outcome::Cancelled));
        }
        let tree = self.parser.parse(path, &text)?;
        let index = LineIndex::new(&text);

        let unsupported = |location: SourceLocation| DocError::UnsupportedPosition {
            path: path.to_path_buf(),
            line: location.line,
            column: location.column,
        };
        let offset = match cursor {
            Cursor::Offset(offset) => offset,
            Cursor::Location(location) => {
                index.offset(location).ok_or_else(|| unsupported(location))?
            }
        };

        let options = ClassifyOptions::from(self.builder.config());
        let (anchor, draft) = match classify_position(&tree, offset, options) {
            Some(target) => {
                let node = tree.node(target.node);
                if node.has_header() {
                    return Ok(GenerationReport::new(scope, 0, Outcome::AlreadyDocumented));
                }
                debug!(kind = %target.kind, name = node.name_or_default(), "building header");
                (node.anchor(), self.builder.build(&tree, target).await)
            }
            None if only_whitespace_before(&text, offset) => {
                if text.trim_start().starts_with("/**") {
                    return Ok(GenerationReport::new(scope, 0, Outcome::AlreadyDocumented));
                }
                debug!("building file header");
                (0, self.builder.build_file(&tree).await)
            }
            None => return Err(unsupported(index.location(offset))),
        };
        if self.cancel.is_cancelled() {
            return Ok(GenerationReport::new(scope, 0, Outcome::Cancelled));
        }

        let mode = if self.interactive.supports_snippets() {
            RenderMode::Snippet
        } else {
            RenderMode::Plain
        };
        let style = self.builder.render_style(index.indentation(anchor), mode);
        let header = render(&draft, &style);

        let inserted = self.interactive.insert(path, &header, anchor).await;
        let report = if inserted {
            GenerationReport::new(scope, 1, Outcome::Applied)
        } else {
            warn!(path = %path.display(), "host rejected the header");
            GenerationReport::new(scope, 0, Outcome::InsertionFailed)
        };
        Ok(report)
    }

    async fn run_file(&self, scope: GenerationScope, path: &Path) -> Result<GenerationReport> {
        let mut batch = EditBatch::new();
        let pass = self.document_file(path, &mut batch, true).await?;
        self.progress.finish();
        Ok(self.conclude(scope, &batch, pass.generated, pass.cancelled).await)
    }

    async fn run_tree(&self, scope: GenerationScope, root: Option<&Path>) -> Result<GenerationReport> {
        let glob = self.builder.config().file_glob.clone();
        let files = self.workspace.find_files(&glob, root).await?;
        if self.cancel.is_cancelled() {
            return Ok(GenerationReport::new(scope, 0, Outcome::Cancelled));
        }

        let mut batch = EditBatch::new();
        let mut generated = 0;
        let mut skipped_files = Vec::new();
        let mut cancelled = false;

        self.progress.start(files.len());
        for path in &files {
            match self.document_file(path, &mut batch, false).await {
                Ok(pass) => {
                    generated += pass.generated;
                    cancelled = pass.cancelled;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping file");
                    skipped_files.push(SkippedFile {
                        path: path.clone(),
                        reason: error.to_string(),
                    });
                }
            }
            self.progress.advance(&path.display().to_string());
            if cancelled || self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
        }
        self.progress.finish();

        let mut report = self.conclude(scope, &batch, generated, cancelled).await;
        report.skipped_files = skipped_files;
        Ok(report)
    }

    /// Reads `path` once the parser has accepted its language.
    async fn read_source(&self, path: &Path) -> Result<String> {
        if !self.parser.supports(path) {
            return Err(DocError::UnsupportedScope {
                path: path.to_path_buf(),
            });
        }
        self.workspace.read_text(path).await
    }

    /// Builds headers for the undocumented declarations of one file into
    /// `batch`, last declaration first.
    async fn document_file(
        &self,
        path: &Path,
        batch: &mut EditBatch,
        report_declarations: bool,
    ) -> Result<FilePass> {
        let text = self.read_source(path).await?;
        if self.cancel.is_cancelled() {
            return Ok(FilePass {
                generated: 0,
                cancelled: true,
            });
        }
        let tree = self.parser.parse(path, &text)?;
        let index = LineIndex::new(&text);

        let options = ClassifyOptions::from(self.builder.config());
        let mut targets: Vec<_> = file_declarations(&tree, options)
            .into_iter()
            .filter(|target| !tree.node(target.node).has_header())
            .collect();
        targets.sort_by_key(|target| std::cmp::Reverse(tree.node(target.node).anchor()));

        if report_declarations {
            self.progress.start(targets.len());
        }
        let mut generated = 0;
        for target in targets {
            let node = tree.node(target.node);
            debug!(
                path = %path.display(),
                kind = %target.kind,
                name = node.name_or_default(),
                "building header"
            );
            let draft = self.builder.build(&tree, target).await;
            if self.cancel.is_cancelled() {
                return Ok(FilePass {
                    generated,
                    cancelled: true,
                });
            }
            let anchor = node.anchor();
            let style = self
                .builder
                .render_style(index.indentation(anchor), RenderMode::Plain);
            batch.push(path, anchor, render(&draft, &style));
            generated += 1;
            if report_declarations {
                self.progress.advance(node.name_or_default());
            }
        }
        Ok(FilePass {
            generated,
            cancelled: false,
        })
    }

    async fn conclude(
        &self,
        scope: GenerationScope,
        batch: &EditBatch,
        generated: usize,
        cancelled: bool,
    ) -> GenerationReport {
        if cancelled {
            info!(generated, "cancelled, discarding {} pending edits", batch.len());
            return GenerationReport::new(scope, generated, Outcome::Cancelled);
        }
        if batch.is_empty() {
            return GenerationReport::new(scope, 0, Outcome::NothingToGenerate);
        }
        let applied = self.batch.apply_all(batch).await;
        if !applied {
            warn!(edits = batch.len(), "host rejected the edit batch");
            return GenerationReport::new(scope, 0, Outcome::InsertionFailed);
        }
        if self.cancel.is_cancelled() {
            debug!("cancelled after the batch was applied");
        }
        GenerationReport::new(scope, generated, Outcome::Applied)
    }
}

fn only_whitespace_before(text: &str, offset: u32) -> bool {
    text.get(..offset as usize)
        .is_some_and(|prefix| prefix.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_prefix_detection() {
        assert!(only_whitespace_before("  \n\tfoo", 3));
        assert!(only_whitespace_before("", 0));
        assert!(!only_whitespace_before("x = 1", 2));
        assert!(!only_whitespace_before("ab", 9));
    }

    #[test]
    fn scope_display() {
        let scope = GenerationScope::Position {
            path: PathBuf::from("a.ts"),
            cursor: Cursor::Location(SourceLocation::new(3, 4)),
        };
        assert_eq!(scope.to_string(), "a.ts:3:4");
        assert_eq!(GenerationScope::Workspace(None).to_string(), "workspace");
        assert_eq!(scope.name(), "position");
    }
}
