//! Command-line interface definitions.
//!
//! Every subcommand names a generation scope. Options that override the
//! configuration file live in [`GenerationArgs`] and are shared by all of
//! them.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generate JSDoc headers for JavaScript and TypeScript declarations.
#[derive(Parser, Debug)]
#[command(name = "docstamp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ./docstamp.json when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the documented sources instead of writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(flatten)]
    pub generation: GenerationArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Document the declaration at a position in a file
    At(AtArgs),

    /// Document every undocumented declaration in a file
    File(FileArgs),

    /// Document every matching file under a directory
    Folder(FolderArgs),

    /// Document every matching file in the workspace
    Workspace(WorkspaceArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AtArgs {
    /// Source file
    pub file: PathBuf,

    /// One-based line of the cursor
    #[arg(short, long, requires = "column", conflicts_with = "offset")]
    pub line: Option<u32>,

    /// One-based column of the cursor
    #[arg(short = 'C', long, requires = "line", conflicts_with = "offset")]
    pub column: Option<u32>,

    /// Byte offset of the cursor
    #[arg(short, long, required_unless_present = "line")]
    pub offset: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Source file
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct FolderArgs {
    /// Directory to traverse
    pub dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Overrides applied on top of the configuration file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Description strategy
    #[arg(long, global = true, value_enum)]
    pub description_style: Option<StyleArg>,

    /// Omit `{type}` values from tag lines
    #[arg(long, global = true)]
    pub no_types: bool,

    /// Value of the `@author` line
    #[arg(long, global = true)]
    pub author: Option<String>,

    /// strftime pattern of the `@date` line
    #[arg(long, global = true, value_name = "PATTERN")]
    pub date_format: Option<String>,

    /// Glob of files visited by folder and workspace runs
    #[arg(long, global = true, value_name = "GLOB")]
    pub glob: Option<String>,

    /// Describe declarations with a local Ollama model
    #[arg(long, global = true)]
    pub ollama: bool,

    /// Ollama model name
    #[arg(long, global = true, requires = "ollama")]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long, global = true, requires = "ollama")]
    pub ollama_url: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleArg {
    Placeholder,
    Static,
}

impl StyleArg {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleArg::Placeholder => "placeholder",
            StyleArg::Static => "static",
        }
    }
}
