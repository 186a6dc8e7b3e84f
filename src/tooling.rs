//! Tooling & Integration Layer
//!
//! Command-line entry points over the library's identity and remote modules.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
