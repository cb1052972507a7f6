//! docstamp CLI entry point: parse arguments, set up logging and colors,
//! dispatch the command.

use clap::Parser;
use docstamp_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::generate_execute(args)
        .await
        .map_err(error::cli_error_to_miette)
}
