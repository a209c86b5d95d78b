//! CLI module for ledgerdb
//!
//! Provides command-line interface for:
//! - init: Write a default config and create the data directory
//! - start: Replay the log and run the interactive shell
//! - exec: Run one shell command and exit

mod args;
mod commands;
mod config;
mod errors;
mod repl;
mod seed;

pub use args::{Cli, Command};
pub use commands::{boot, exec, init, run, run_command, start};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use repl::{execute, parse_filters, run_shell, ShellCommand, HELP};
pub use seed::seed_sample_data;
