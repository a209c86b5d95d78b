//! CLI argument definitions using clap
//!
//! Commands:
//! - ledgerdb init --config <path>
//! - ledgerdb start --config <path>
//! - ledgerdb exec --config <path> <command...>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ledgerdb - an embedded, write-ahead-logged table store
#[derive(Parser, Debug)]
#[command(name = "ledgerdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file and create the data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./ledgerdb.json")]
        config: PathBuf,
    },

    /// Replay the log and run the interactive shell
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./ledgerdb.json")]
        config: PathBuf,
    },

    /// Run one shell command and exit
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = "./ledgerdb.json")]
        config: PathBuf,

        /// Shell command, e.g. `select customers id,name id=1`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec() {
        let cli = Cli::try_parse_from([
            "ledgerdb",
            "exec",
            "--config",
            "cfg.json",
            "select",
            "customers",
            "id,name",
        ])
        .unwrap();
        match cli.command {
            Command::Exec { config, command } => {
                assert_eq!(config, PathBuf::from("cfg.json"));
                assert_eq!(command, vec!["select", "customers", "id,name"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["ledgerdb", "start"]).unwrap();
        assert!(matches!(cli.command, Command::Start { config } if config == PathBuf::from("./ledgerdb.json")));
    }

    #[test]
    fn test_exec_requires_command() {
        assert!(Cli::try_parse_from(["ledgerdb", "exec"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
