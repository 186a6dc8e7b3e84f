//! Clawsino CLI Binary
//!
//! Command-line client for the Clawsino gaming service.

use clap::Parser;
use clawsino::logging::init_logging;
use clawsino::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Logging is best-effort; a bad log target must not block the command
    if let Err(e) = init_logging(&context.config().logging, context.log_overrides()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
