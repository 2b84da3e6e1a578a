//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Building the command registry (`commands`)
//! - Wiring registries and configuration into the dispatcher
//! - Mapping the dispatcher result to a process exit code

use std::process::ExitCode;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run(std::env::args().skip(1)).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
