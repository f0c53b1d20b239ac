//! # kw - Keyboard Warrior
//!
//! Command-line host for the Keyboard Warrior interpreter.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive shell
//! kw
//!
//! # One-off commands; indices refer to the full list as `kw exec list` prints it
//! kw exec add Buy milk after work
//! kw exec list
//! kw exec delete 1
//! # `undo` needs the shell: one-shot sessions keep no undo journal
//!
//! # Timestamped copy of the data file
//! kw backup
//! ```
//!
//! Set `RUST_LOG` or pass `--verbose` to see what the interpreter is doing.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use keyboard_warrior::cli::{Cli, Commands};
use keyboard_warrior::shell::{run_exec, run_shell};
use keyboard_warrior::storage::{create_backup, default_path, JsonStorage};
use keyboard_warrior::Logic;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "keyboard_warrior=debug,info"
    } else {
        "keyboard_warrior=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let data_path = cli.data_file.unwrap_or_else(default_path);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut logic = open_session(&data_path)?;
            run_shell(&mut logic, io::stdin().lock(), io::stdout().lock())
        }
        Commands::Exec { line } => {
            let mut logic = open_session(&data_path)?;
            run_exec(&mut logic, &line.join(" "), io::stdout().lock())
        }
        Commands::Backup => {
            let backup = create_backup(&data_path).context("Backup failed")?;
            println!("Created backup: {}", backup.display());
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut app = Cli::command();
            let app_name = app.get_name().to_string();
            generate(shell, &mut app, app_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn open_session(data_path: &Path) -> Result<Logic<JsonStorage>> {
    Logic::load(JsonStorage::new(data_path))
        .with_context(|| format!("Could not load tasks from {}", data_path.display()))
}
