//! # Tally CLI
//!
//! Command-line front end for the estimation engine.
//!
//! ```text
//! tally list
//! tally show asphalt-paving
//! tally estimate asphalt-paving --length 40 --width 12 --set thickness=3
//! tally estimate pool-chlorine --volume 20000 --set current_fc=1 --set target_fc=8 --json
//! tally estimate --config wall.json --inputs backyard.json --metric
//! ```

mod cli;
mod commands;
mod logging;
mod report;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands::{run_estimate, run_list, run_show};
use crate::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity.tracing_level_filter(), cli.verbosity.is_present());

    let result = match &cli.command {
        Command::List => run_list(),
        Command::Show(args) => run_show(args),
        Command::Estimate(args) => run_estimate(args),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
