//! ledgerdb CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints any error to
//! stderr and exits non-zero on failure. All other logic lives in `cli`.

use ledgerdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
