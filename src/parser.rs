//! Turns one raw input line into a `Command`.
//!
//! Parsing never fails outward: every malformed line becomes
//! `Command::Incorrect` carrying the message to show. Every non-blank line is
//! recorded in the input history before dispatch, including unknown words.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cmd::*;
use crate::history::InputHistory;
use crate::task::Task;

/// Parse `raw` into the command it names.
///
/// Unknown command words fall back to `help`. Matching is case-sensitive.
pub fn parse_command(raw: &str, history: &mut InputHistory) -> Command {
    let Some((word, args)) = split_command_word(raw) else {
        return Command::incorrect(invalid_format(HELP_USAGE));
    };

    history.record(raw);
    debug!(word, "dispatching command word");

    match word {
        ADD_WORD => prepare_add(args),
        DELETE_WORD => match parse_displayed_index(args) {
            Some(index) => Command::Delete { index },
            None => Command::incorrect(invalid_format(DELETE_USAGE)),
        },
        EDIT_WORD => prepare_edit(args),
        CLEAR_WORD => Command::Clear,
        FIND_WORD => prepare_find(args),
        LIST_WORD => Command::List,
        VIEW_WORD => match parse_displayed_index(args) {
            Some(index) => Command::View { index },
            None => Command::incorrect(invalid_format(VIEW_USAGE)),
        },
        VIEW_ALL_WORD => match parse_displayed_index(args) {
            Some(index) => Command::ViewAll { index },
            None => Command::incorrect(invalid_format(VIEW_ALL_USAGE)),
        },
        EXIT_WORD => Command::Exit,
        UNDO_WORD => prepare_undo(history),
        _ => Command::Help,
    }
}

/// Split a line into its command word and the remaining arguments.
/// `None` for a line with no visible content.
fn split_command_word(raw: &str) -> Option<(&str, &str)> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(char::is_whitespace).unwrap_or((line, "")))
}

/// Parse the arguments as a single displayed index. Range is checked later,
/// against the last shown list.
fn parse_displayed_index(args: &str) -> Option<i64> {
    args.trim().parse::<i64>().ok()
}

fn prepare_add(args: &str) -> Command {
    let details = args.trim();
    // '/' is reserved for field prefixes.
    if details.is_empty() || details.contains('/') {
        return Command::incorrect(invalid_format(ADD_USAGE));
    }
    match Task::new(details) {
        Ok(task) => Command::Add { task },
        Err(e) => Command::incorrect(e.to_string()),
    }
}

fn prepare_edit(args: &str) -> Command {
    let Some((index, details)) = args.trim().split_once(char::is_whitespace) else {
        return Command::incorrect(invalid_format(EDIT_USAGE));
    };
    let Some(index) = parse_displayed_index(index) else {
        return Command::incorrect(invalid_format(EDIT_USAGE));
    };
    match Task::new(details) {
        Ok(task) => Command::Edit { index, task },
        Err(e) => Command::incorrect(e.to_string()),
    }
}

fn prepare_find(args: &str) -> Command {
    let keywords: BTreeSet<String> = args.split_whitespace().map(str::to_string).collect();
    if keywords.is_empty() {
        return Command::incorrect(invalid_format(FIND_USAGE));
    }
    Command::Find { keywords }
}

fn prepare_undo(history: &mut InputHistory) -> Command {
    match history.take_undo_target() {
        Some(previous) => Command::Undo { previous },
        None => Command::incorrect(MESSAGE_NOTHING_TO_UNDO),
    }
}
