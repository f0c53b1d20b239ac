//! Interactive line loop around a `Logic` session.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cmd::UNDO_WORD;
use crate::db::format_task_table;
use crate::logic::Logic;
use crate::storage::Storage;

pub const WELCOME: &str = "Welcome to Keyboard Warrior! Type 'help' to see all commands.";
pub const PROMPT: &str = "Enter command: ";
pub const DIVIDER: &str = "===================================================";

/// Column width used when listing tasks.
pub const LIST_WIDTH: usize = 72;

/// Reply to `undo` from a one-shot session, which has no journal to revert.
pub const MESSAGE_UNDO_NEEDS_SHELL: &str =
    "Undo only reverts changes made earlier in the same session; use `kw shell`";

/// Read lines from `input` until `exit` or end of input, printing each result
/// to `output`.
///
/// Bytes that are not valid UTF-8 are decoded lossily and handed to the
/// interpreter like any other line. A read or persistence failure ends the
/// loop with an error.
pub fn run_shell<S, R, W>(logic: &mut Logic<S>, mut input: R, mut output: W) -> Result<()>
where
    S: Storage,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{WELCOME}")?;
    writeln!(output, "{DIVIDER}")?;

    let mut buf = Vec::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).context("Failed to read input")? == 0 {
            writeln!(output)?;
            break;
        }
        let line = String::from_utf8_lossy(strip_line_ending(&buf));

        let result = match logic.execute(&line) {
            Ok(result) => result,
            Err(e) => {
                writeln!(output, "Error: {e}")?;
                return Err(e).context("Session ended because the task list could not be saved");
            }
        };

        if let Some(tasks) = &result.relevant_tasks {
            write!(output, "{}", format_task_table(tasks, LIST_WIDTH))?;
        }
        writeln!(output, "{}", result.feedback)?;
        writeln!(output, "{DIVIDER}")?;

        if result.exit {
            info!("exit requested");
            break;
        }
    }
    Ok(())
}

/// Run one command line in a fresh session and print its result.
///
/// The session has no earlier listing, so indices address the full
/// collection. `undo` is refused without touching the data file.
pub fn run_exec<S, W>(logic: &mut Logic<S>, line: &str, mut output: W) -> Result<()>
where
    S: Storage,
    W: Write,
{
    if line.split_whitespace().next() == Some(UNDO_WORD) {
        writeln!(output, "{MESSAGE_UNDO_NEEDS_SHELL}")?;
        return Ok(());
    }

    let all = logic.tasks().as_slice().to_vec();
    logic.set_last_shown_list(all);

    let result = logic.execute(line)?;
    if let Some(tasks) = &result.relevant_tasks {
        write!(output, "{}", format_task_table(tasks, LIST_WIDTH))?;
    }
    writeln!(output, "{}", result.feedback)?;
    Ok(())
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
