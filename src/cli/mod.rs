//! Command-line interface for prompt-forge.
//!
//! Maps the request form onto flags of the `generate` command and prints the
//! assembled prompt as text or JSON.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands, GenerateArgs};
