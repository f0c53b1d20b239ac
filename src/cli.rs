use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Keyboard Warrior: a line-oriented personal task list.
/// Storage defaults to ~/.keyboard_warrior/tasks.json or a path passed via --data-file.
#[derive(Parser, Debug)]
#[command(name = "kw", version, about = "Line-oriented personal task list")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(long, global = true, env = "KW_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive command shell (default).
    Shell,

    /// Run a single command line, e.g. `kw exec add Buy milk`.
    /// Indices address the full list; `undo` is only available in the shell.
    Exec {
        /// Command word followed by its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Create a timestamped backup of the data file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
