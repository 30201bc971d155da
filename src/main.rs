//! acts - add, display and delete activities to do
//!
//! Activities live in an append-only text log; `get` lists the ones that
//! are due, `done` and `delay` append new events rather than editing.

use acts::cli::Cli;
use acts::error::exit_codes;
use acts::output::{emit_error, infer_command_name_from_args};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG; ignore invalid/huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    let code = match cli.run() {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let _ = emit_error(&command, &err, json);
            err.exit_code()
        }
    };
    std::process::exit(code);
}
