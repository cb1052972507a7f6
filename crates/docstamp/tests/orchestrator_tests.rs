//! Scope traversal against a real filesystem host.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docstamp::{
    BatchSink, Cursor, DocError, EditBatch, FsWorkspace, GenerationScope, GeneratorConfig,
    HeaderBuilder, InteractiveSink, Orchestrator, Outcome, OxcParser, PreviewSink, SourceLocation,
    SyntacticOracle, Workspace, configured_source,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn header_builder() -> Arc<HeaderBuilder> {
    let config = GeneratorConfig::default();
    let descriptions = configured_source(&config);
    Arc::new(HeaderBuilder::new(
        Arc::new(config),
        Arc::new(SyntacticOracle),
        descriptions,
    ))
}

fn orchestrator<H>(host: Arc<H>) -> Orchestrator
where
    H: Workspace + InteractiveSink + BatchSink + 'static,
{
    Orchestrator::new(header_builder(), Arc::new(OxcParser::new()), host)
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

const TWO_FUNCTIONS: &str = "function a() {}\n\nfunction b(x: number, y: string) {\n  return x;\n}\n";

const TWO_FUNCTIONS_DOCUMENTED: &str = "/**\n * Description placeholder\n */\nfunction a() {}\n\n/**\n * Description placeholder\n *\n * @param {number} x\n * @param {string} y\n * @returns {*}\n */\nfunction b(x: number, y: string) {\n  return x;\n}\n";

#[tokio::test]
async fn file_scope_documents_every_declaration_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS);
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator
        .run(GenerationScope::File(path.clone()))
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Applied);
    assert_eq!(report.generated, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_FUNCTIONS_DOCUMENTED);
}

#[tokio::test]
async fn rerunning_file_scope_generates_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS_DOCUMENTED);
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator.run(GenerationScope::File(path.clone())).await.unwrap();
    assert_eq!(report.generated, 0);
    assert_eq!(report.outcome, Outcome::NothingToGenerate);
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_FUNCTIONS_DOCUMENTED);
}

#[tokio::test]
async fn class_members_keep_their_indentation() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "a.ts", "class A {\n  run() {}\n}\n");
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator.run(GenerationScope::File(path.clone())).await.unwrap();
    assert_eq!(report.generated, 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "/**\n * Description placeholder\n *\n * @class A\n * @typedef {A}\n */\nclass A {\n  /**\n   * Description placeholder\n   */\n  run() {}\n}\n"
    );
}

#[tokio::test]
async fn position_scope_documents_only_the_enclosing_declaration() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS);
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator
        .run(GenerationScope::Position {
            path: path.clone(),
            cursor: Cursor::Location(SourceLocation::new(4, 5)),
        })
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Applied);
    assert_eq!(report.generated, 1);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("function a() {}\n\n/**\n"), "{text}");
    assert_eq!(text.matches("/**").count(), 1);
}

#[tokio::test]
async fn position_on_documented_declaration_reports_it() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS_DOCUMENTED);
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let offset = TWO_FUNCTIONS_DOCUMENTED.find("return").unwrap() as u32;
    let report = orchestrator
        .run(GenerationScope::Position {
            path,
            cursor: Cursor::Offset(offset),
        })
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::AlreadyDocumented);
    assert_eq!(report.generated, 0);
}

#[tokio::test]
async fn leading_whitespace_position_gets_a_file_header() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "x.js", "\n\nconst x = 1;\n");
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator
        .run(GenerationScope::Position {
            path: path.clone(),
            cursor: Cursor::Offset(1),
        })
        .await
        .unwrap();
    assert_eq!(report.generated, 1);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "/**\n * Description placeholder\n */\n\n\nconst x = 1;\n"
    );
}

#[tokio::test]
async fn position_outside_declarations_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "call.js", "console.log(1);\n");
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let error = orchestrator
        .run(GenerationScope::Position {
            path,
            cursor: Cursor::Location(SourceLocation::new(1, 5)),
        })
        .await
        .unwrap_err();
    match error {
        DocError::UnsupportedPosition { line, column, .. } => {
            assert_eq!((line, column), (1, 5));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn unsupported_file_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "notes.txt", "hello\n");
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let error = orchestrator.run(GenerationScope::File(path)).await.unwrap_err();
    assert!(matches!(error, DocError::UnsupportedScope { .. }));
}

#[tokio::test]
async fn unsupported_file_type_is_rejected_before_reading() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let error = orchestrator
        .run(GenerationScope::Position {
            path: dir.path().join("missing.txt"),
            cursor: Cursor::Offset(0),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, DocError::UnsupportedScope { .. }));
}

#[tokio::test]
async fn folder_scope_skips_broken_files() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "src/good.ts", "export function ok() {}\n");
    let broken = write(dir.path(), "src/broken.ts", "function (\n");
    write(dir.path(), "src/node_modules/dep/index.js", "function dep() {}\n");
    let orchestrator = orchestrator(Arc::new(FsWorkspace::new(dir.path())));

    let report = orchestrator
        .run(GenerationScope::Folder(dir.path().join("src")))
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Applied);
    assert_eq!(report.generated, 1);
    assert_eq!(report.skipped_files.len(), 1);
    assert_eq!(report.skipped_files[0].path, broken);
    assert!(fs::read_to_string(&good).unwrap().starts_with("/**\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/node_modules/dep/index.js")).unwrap(),
        "function dep() {}\n"
    );
}

#[tokio::test]
async fn dry_run_sink_leaves_files_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS);
    let host = Arc::new(FsWorkspace::new(dir.path()));
    let preview = Arc::new(PreviewSink::new(host.clone()));
    let orchestrator = orchestrator(host).with_sinks(preview.clone(), preview.clone());

    let report = orchestrator.run(GenerationScope::Workspace(None)).await.unwrap();
    assert_eq!(report.generated, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_FUNCTIONS);
    assert_eq!(
        preview.results().get(&path).map(String::as_str),
        Some(TWO_FUNCTIONS_DOCUMENTED)
    );
}

#[tokio::test]
async fn snippet_sinks_receive_placeholders() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "f.ts", "function f(a: string) {}\n");
    let host = Arc::new(FsWorkspace::new(dir.path()));
    let preview = Arc::new(PreviewSink::new(host.clone()).with_snippets(true));
    let orchestrator = orchestrator(host).with_sinks(preview.clone(), preview.clone());

    orchestrator
        .run(GenerationScope::Position {
            path: path.clone(),
            cursor: Cursor::Offset(0),
        })
        .await
        .unwrap();
    let text = preview.results().remove(&path).unwrap();
    assert!(text.starts_with("/**\n * ${1:Description placeholder}\n"), "{text}");
}

/// Sink that rejects every edit.
struct RejectingSink;

#[async_trait]
impl InteractiveSink for RejectingSink {
    async fn insert(&self, _path: &Path, _text: &str, _offset: u32) -> bool {
        false
    }
}

#[async_trait]
impl BatchSink for RejectingSink {
    async fn apply_all(&self, _batch: &EditBatch) -> bool {
        false
    }
}

#[tokio::test]
async fn rejected_batch_reports_insertion_failure() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS);
    let sink = Arc::new(RejectingSink);
    let orchestrator =
        orchestrator(Arc::new(FsWorkspace::new(dir.path()))).with_sinks(sink.clone(), sink);

    let report = orchestrator.run(GenerationScope::File(path.clone())).await.unwrap();
    assert_eq!(report.outcome, Outcome::InsertionFailed);
    assert_eq!(report.generated, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_FUNCTIONS);
}

/// Filesystem host that cancels the run once a number of files were read.
struct CancellingHost {
    inner: FsWorkspace,
    token: CancellationToken,
    cancel_after: usize,
    reads: AtomicUsize,
}

#[async_trait]
impl Workspace for CancellingHost {
    async fn find_files(&self, glob: &str, root: Option<&Path>) -> docstamp::Result<Vec<PathBuf>> {
        self.inner.find_files(glob, root).await
    }

    async fn read_text(&self, path: &Path) -> docstamp::Result<String> {
        let text = self.inner.read_text(path).await;
        if self.reads.fetch_add(1, Ordering::SeqCst) + 1 >= self.cancel_after {
            self.token.cancel();
        }
        text
    }
}

#[async_trait]
impl InteractiveSink for CancellingHost {
    async fn insert(&self, path: &Path, text: &str, offset: u32) -> bool {
        self.inner.insert(path, text, offset).await
    }
}

#[async_trait]
impl BatchSink for CancellingHost {
    async fn apply_all(&self, batch: &EditBatch) -> bool {
        self.inner.apply_all(batch).await
    }
}

#[tokio::test]
async fn cancelled_workspace_run_applies_nothing() {
    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = ["a.ts", "b.ts", "c.ts"]
        .iter()
        .map(|name| write(dir.path(), name, TWO_FUNCTIONS))
        .collect();
    let token = CancellationToken::new();
    let host = Arc::new(CancellingHost {
        inner: FsWorkspace::new(dir.path()),
        token: token.clone(),
        cancel_after: 2,
        reads: AtomicUsize::new(0),
    });
    let orchestrator = orchestrator(host).with_cancellation(token);

    let report = orchestrator.run(GenerationScope::Workspace(None)).await.unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    // only the first file was fully processed before the second read cancelled
    assert!(report.generated <= 2, "{}", report.generated);
    for path in files {
        assert_eq!(fs::read_to_string(path).unwrap(), TWO_FUNCTIONS);
    }
}

#[tokio::test]
async fn pre_cancelled_run_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "two.ts", TWO_FUNCTIONS);
    let token = CancellationToken::new();
    token.cancel();
    let orchestrator =
        orchestrator(Arc::new(FsWorkspace::new(dir.path()))).with_cancellation(token);

    let report = orchestrator.run(GenerationScope::File(path.clone())).await.unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.generated, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), TWO_FUNCTIONS);
}
