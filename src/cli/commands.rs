//! CLI command implementations
//!
//! Boot sequence shared by `start` and `exec`:
//! 1. Configuration load and log level
//! 2. WAL open and replay
//! 3. Sample seeding, only when the WAL did not exist before boot
//!
//! Any failure before the shell runs is fatal.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::json;

use crate::engine::Engine;
use crate::observability::{log_event_with_fields, set_min_severity, Event, Severity};
use crate::wal::FileWal;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::repl::{execute, run_shell, ShellCommand};
use super::seed::seed_sample_data;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
        Command::Exec { config, command } => exec(&config, &command.join(" ")),
    }
}

/// Writes a default configuration file and creates its data directory
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::AlreadyInitialized(config_path.to_path_buf()));
    }

    let config = Config::new("data");
    config.save(config_path)?;
    fs::create_dir_all(config.data_path()).map_err(|e| {
        CliError::config(format!("failed to create {}: {}", config.data_dir, e))
    })?;

    let response = json!({
        "initialized": true,
        "config": config_path.display().to_string(),
        "data_dir": config.data_dir,
    });
    println!("{}", response);
    Ok(())
}

/// Boots the engine and runs the shell on stdin/stdout
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = boot(&config)?;

    log_event_with_fields(Event::ShellStart, Severity::Info, &[("data_dir", config.data_dir.as_str())]);
    println!("ledgerdb shell. Type 'help' for commands.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let executed = run_shell(&engine, stdin.lock(), &mut stdout)?;
    writeln!(stdout)?;

    log_event_with_fields(Event::ShellExit, Severity::Info, &[("commands", executed.to_string().as_str())]);
    Ok(())
}

/// Boots the engine, runs one shell command and prints its output
pub fn exec(config_path: &Path, line: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let engine = boot(&config)?;
    let output = execute(&engine, ShellCommand::parse(line)?)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        Severity::Info,
        &[
            ("config", config_path.display().to_string().as_str()),
            ("data_dir", config.data_dir.as_str()),
        ],
    );
    Ok(config)
}

/// Opens the engine described by `config`, seeding a brand-new log if asked
pub fn boot(config: &Config) -> CliResult<Engine> {
    let fresh = !config.wal_path().exists();
    let wal = FileWal::open(config.data_path(), &config.wal_file, config.wal_sync_mode)?;
    let engine = Engine::open(wal)?;

    if config.seed_sample_data && fresh {
        seed_sample_data(&engine)?;
        log_event_with_fields(Event::SeedComplete, Severity::Info, &[("tables", "customers,orders")]);
    }
    Ok(engine)
}
