//! Header generation for every scope.

use std::path::Path;
use std::sync::Arc;

use docstamp::{
    Cursor, DescriptionSource, FsWorkspace, GenerationReport, GenerationScope, GeneratorConfig,
    HeaderBuilder, Orchestrator, OxcParser, Outcome, PreviewSink, SourceLocation,
    SyntacticOracle, configured_source,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::config::load_config;
use crate::error::{CliError, Result};
use crate::ui;

/// Runs the subcommand in `cli` from the current directory.
pub async fn execute(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref(), &cli.generation)?;
    let scope = scope_for(&cli.command)?;
    check_target(&cwd, &scope)?;

    let cancel = CancellationToken::new();
    watch_ctrl_c(cancel.clone());

    let descriptions = description_source(&config, &cancel).await;
    let builder = Arc::new(HeaderBuilder::new(
        Arc::new(config),
        Arc::new(SyntacticOracle),
        descriptions,
    ));
    let host = Arc::new(FsWorkspace::new(&cwd));
    let progress = Arc::new(ui::GenerationProgress::new(cli.quiet));

    let mut orchestrator = Orchestrator::new(builder, Arc::new(OxcParser::new()), host.clone())
        .with_progress(progress)
        .with_cancellation(cancel);

    let preview = cli.dry_run.then(|| Arc::new(PreviewSink::new(host)));
    if let Some(preview) = &preview {
        orchestrator = orchestrator.with_sinks(preview.clone(), preview.clone());
    }

    let report = orchestrator.run(scope).await?;

    if let Some(preview) = preview {
        for (path, text) in preview.results() {
            println!("// {}", display_path(&cwd, &path));
            print!("{text}");
        }
    }

    summarize(&report, cli.dry_run, cli.quiet)
}

/// Maps a subcommand to the generation scope it names.
pub fn scope_for(command: &Command) -> Result<GenerationScope> {
    let scope = match command {
        Command::At(args) => {
            let cursor = match (args.offset, args.line, args.column) {
                (Some(offset), _, _) => Cursor::Offset(offset),
                (None, Some(line), Some(column)) => {
                    if line == 0 || column == 0 {
                        return Err(CliError::InvalidArgument(
                            "--line and --column are one-based".to_string(),
                        ));
                    }
                    Cursor::Location(SourceLocation::new(line, column))
                }
                _ => {
                    return Err(CliError::InvalidArgument(
                        "either --offset or both --line and --column are required".to_string(),
                    ));
                }
            };
            GenerationScope::Position {
                path: args.file.clone(),
                cursor,
            }
        }
        Command::File(args) => GenerationScope::File(args.file.clone()),
        Command::Folder(args) => GenerationScope::Folder(args.dir.clone()),
        Command::Workspace(args) => GenerationScope::Workspace(args.root.clone()),
    };
    Ok(scope)
}

fn check_target(cwd: &Path, scope: &GenerationScope) -> Result<()> {
    let target = match scope {
        GenerationScope::Position { path, .. } | GenerationScope::File(path) => {
            Some((path, cwd.join(path).is_file()))
        }
        GenerationScope::Folder(dir) | GenerationScope::Workspace(Some(dir)) => {
            Some((dir, cwd.join(dir).is_dir()))
        }
        GenerationScope::Workspace(None) => None,
    };
    match target {
        Some((path, false)) => Err(CliError::FileNotFound(path.clone())),
        _ => Ok(()),
    }
}

fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}

/// Generative descriptions when configured and reachable, otherwise the
/// configured placeholder or static strategy.
async fn description_source(
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Arc<dyn DescriptionSource> {
    if !config.generative.enabled() {
        return configured_source(config);
    }

    #[cfg(feature = "llm")]
    {
        use docstamp::{GenerativeDescriptions, GenerativeToggles, OllamaDescriber};

        match OllamaDescriber::connect(config.generative.clone()).await {
            Ok(describer) => {
                return Arc::new(
                    GenerativeDescriptions::new(Arc::new(describer))
                        .with_toggles(GenerativeToggles::from(&config.generative))
                        .with_cancellation(cancel.clone()),
                );
            }
            Err(e) => {
                ui::warning(&format!(
                    "Generative descriptions unavailable ({e}); using placeholders"
                ));
            }
        }
    }

    #[cfg(not(feature = "llm"))]
    {
        let _ = cancel;
        ui::warning("Built without the llm feature; using placeholders");
    }

    configured_source(config)
}

fn summarize(report: &GenerationReport, dry_run: bool, quiet: bool) -> Result<()> {
    for skipped in &report.skipped_files {
        ui::warning(&format!(
            "Skipped {}: {}",
            skipped.path.display(),
            skipped.reason
        ));
    }

    match report.outcome {
        Outcome::Applied if !quiet => {
            let verb = if dry_run { "Would generate" } else { "Generated" };
            ui::success(&format!(
                "{verb} {} {} in {}",
                report.generated,
                headers(report.generated),
                report.scope
            ));
        }
        Outcome::Applied => {}
        Outcome::NothingToGenerate => {
            ui::warning(&format!("No undocumented declarations in {}", report.scope));
        }
        Outcome::AlreadyDocumented => {
            ui::warning(&format!(
                "The declaration at {} already has a documentation header",
                report.scope
            ));
        }
        Outcome::Cancelled => {
            ui::info(&format!(
                "Cancelled after generating {} {}; nothing was written",
                report.generated,
                headers(report.generated)
            ));
        }
        Outcome::InsertionFailed => {
            return Err(CliError::InsertionFailed {
                count: report.generated,
            });
        }
    }
    Ok(())
}

fn headers(count: usize) -> &'static str {
    if count == 1 { "header" } else { "headers" }
}

fn display_path(cwd: &Path, path: &Path) -> String {
    path.strip_prefix(cwd).unwrap_or(path).display().to_string()
}
