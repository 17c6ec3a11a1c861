use std::process::ExitCode;

use clap::Parser;
use console::style;

use genregraph::cli::{self, Cli};
use genregraph::observability::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
