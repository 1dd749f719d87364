//! Thin CLI shell around the SharpTS compiler core library crates
//! (SPEC_FULL.md §12): argument parsing, logging initialization, and
//! error-to-exit-code mapping. Project discovery, config loading, and
//! module resolution are out of scope (spec.md §1) — this crate has no
//! business logic of that kind, only the pipeline wiring and the standalone
//! `rewrite` command.

pub mod args;
pub mod driver;
pub mod logging;

use anyhow::Result;
use args::{CliArgs, Command};
use clap::Parser;
use colored::Colorize;

pub fn run() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    match args.command {
        Command::Rewrite {
            input,
            output,
            handle_map,
            method_token,
        } => match driver::run_rewrite(&input, &output, &handle_map, method_token) {
            Ok(()) => {
                println!("{} rewrote {}", "ok:".green().bold(), output.display());
                Ok(())
            }
            Err(err) => {
                eprintln!("{} {err:#}", "error:".red().bold());
                Err(err)
            }
        },
    }
}
