use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for the `sharpts` binary.
#[derive(Parser, Debug)]
#[command(name = "sharpts", version, about = "SharpTS compiler core driver")]
pub struct CliArgs {
    /// Increase log verbosity; repeat for more detail (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Retarget an already-emitted module against a runtime assembly set
    /// (C10, spec.md §4.8): patch every method body's metadata tokens
    /// through a handle map and re-serialize.
    Rewrite {
        /// Path to the raw method body bytes to rewrite.
        input: PathBuf,
        /// Path to write the patched body bytes to.
        output: PathBuf,
        /// Path to a JSON-encoded old-row -> new-row handle map (see
        /// `driver::HandleMapFile`).
        #[arg(long = "handle-map")]
        handle_map: PathBuf,
        /// Metadata token of the method being rewritten, for diagnostics.
        #[arg(long = "method-token", value_parser = parse_hex_u32, default_value = "0x06000001")]
        method_token: u32,
    },
}

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(trimmed, 16).map_err(|e| e.to_string())
}
