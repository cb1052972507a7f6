#![deny(clippy::all)]

//! Documentation header synthesis for JavaScript/TypeScript declarations.
//!
//! This crate provides:
//! - An owned declaration tree lowered from OXC ASTs, with existing-header detection.
//! - Classification of nodes and cursor positions into declaration kinds.
//! - Per-kind header pipelines producing JSDoc blocks, rendered as plain text or editor snippets.
//! - Pluggable description strategies, including an optional Ollama backend (`llm` feature).
//! - Scope traversal (position, file, folder, workspace) with reverse-order insertion,
//!   cancellation and all-or-nothing edit batches.

pub mod builder;
pub mod classify;
pub mod config;
pub mod description;
pub mod edits;
pub mod error;
pub mod host;
pub mod jsdoc;
pub mod line_index;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod render;
pub mod syntax;
pub mod types;

#[cfg(feature = "llm")]
pub mod llm;

pub use builder::HeaderBuilder;
pub use classify::{Classified, ClassifyOptions, classify_node, classify_position, file_declarations};
pub use config::{
    CustomTag, DescriptionStyle, GenerativeConfig, GeneratorConfig, ServiceKind, DEFAULT_FILE_GLOB,
};
pub use description::{
    DescriptionRequest, DescriptionService, DescriptionSource, GenerativeDescriptions,
    GenerativeToggles, PlaceholderDescriptions, StaticDescriptions, configured_source,
};
pub use edits::{Edit, EditBatch};
pub use error::{DocError, Result};
pub use host::{BatchSink, FsWorkspace, InteractiveSink, PreviewSink, Workspace};
pub use line_index::{LineIndex, SourceLocation};
pub use model::{DeclarationKind, Fragment, HeaderDraft, TagLine};
pub use orchestrator::{
    Cursor, GenerationReport, GenerationScope, NoProgress, Orchestrator, Outcome, ProgressSink,
    SkippedFile,
};
pub use parser::{OxcParser, SourceParser};
pub use render::{RenderMode, RenderStyle, render};
pub use syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
pub use types::{SyntacticOracle, TypeOracle};

#[cfg(feature = "llm")]
pub use llm::{LlmError, OllamaDescriber};
