//! Command implementations for the interpreter.
//!
//! Every operation a user can type is one variant of `Command`. The parser builds
//! a variant with its arguments already validated; `Command::execute` runs it
//! against the session state and always produces a `CommandResult`. User-facing
//! failures (bad index, stale task, nothing to undo) are reported through the
//! result message, never as a Rust error.

use std::collections::BTreeSet;

use tracing::debug;

use crate::db::TaskList;
use crate::history::{Reversal, UndoJournal};
use crate::task::Task;

pub const MESSAGE_INVALID_COMMAND_FORMAT: &str = "Invalid command format! \n";
pub const MESSAGE_INVALID_TASK_DISPLAYED_INDEX: &str = "The task index provided is invalid";
pub const MESSAGE_TASK_NOT_IN_TASKSLIST: &str = "Task could not be found in Keyboard Warrior";
pub const MESSAGE_NOTHING_TO_UNDO: &str = "Nothing to undo";

pub const ADD_WORD: &str = "add";
pub const DELETE_WORD: &str = "delete";
pub const EDIT_WORD: &str = "edit";
pub const CLEAR_WORD: &str = "clear";
pub const FIND_WORD: &str = "find";
pub const LIST_WORD: &str = "list";
pub const VIEW_WORD: &str = "view";
pub const VIEW_ALL_WORD: &str = "viewall";
pub const UNDO_WORD: &str = "undo";
pub const HELP_WORD: &str = "help";
pub const EXIT_WORD: &str = "exit";

pub const ADD_USAGE: &str = "add:\nAdds an item to Keyboard Warrior.\n\t\
    Parameters: DETAILS (must not contain '/')\n\t\
    Example: add Buy milk after work";
pub const DELETE_USAGE: &str = "delete:\nDeletes the item identified by the index number used in the last item listing.\n\t\
    Parameters: INDEX (must be a positive integer)\n\t\
    Example: delete 1";
pub const EDIT_USAGE: &str = "edit:\nReplaces the details of the item identified by the index number used in the last item listing.\n\t\
    Parameters: INDEX NEW_DETAILS\n\t\
    Example: edit 1 Buy oat milk";
pub const CLEAR_USAGE: &str = "clear:\nClears all items in Keyboard Warrior permanently.\n\t\
    Example: clear";
pub const FIND_USAGE: &str = "find:\nFinds all items whose details contain any of the specified keywords (case-insensitive) and displays them as a list with index numbers.\n\t\
    Parameters: KEYWORD [MORE_KEYWORDS]...\n\t\
    Example: find milk bread";
pub const LIST_USAGE: &str = "list:\nDisplays all items in Keyboard Warrior as a list with index numbers.\n\t\
    Example: list";
pub const VIEW_USAGE: &str = "view:\nViews the details of the item identified by the index number in the last shown listing.\n\t\
    Parameters: INDEX\n\t\
    Example: view 1";
pub const VIEW_ALL_USAGE: &str = "viewall:\nViews every field of the item identified by the index number in the last shown listing.\n\t\
    Parameters: INDEX\n\t\
    Example: viewall 1";
pub const UNDO_USAGE: &str = "undo:\nReverts the most recent change to Keyboard Warrior.\n\t\
    Example: undo";
pub const HELP_USAGE: &str = "help:\nShows program usage instructions.\n\t\
    Example: help";
pub const EXIT_USAGE: &str = "exit:\nExits the program.\n\t\
    Example: exit";

pub const MESSAGE_ADD_SUCCESS: &str = "New item added: ";
pub const MESSAGE_DELETE_SUCCESS: &str = "Deleted Item: ";
pub const MESSAGE_EDIT_SUCCESS: &str = "Edited Item: ";
pub const MESSAGE_VIEW_TASK_DETAILS: &str = "Viewing task: ";
pub const MESSAGE_CLEAR_SUCCESS: &str = "All items have been cleared!";
pub const MESSAGE_EXIT_ACKNOWLEDGEMENT: &str = "Exiting Keyboard Warrior as requested ...";
pub const MESSAGE_UNDO_SUCCESS: &str = "Undone: ";

/// Usage text of every command, separated by blank lines.
pub fn all_usages() -> String {
    [
        ADD_USAGE,
        DELETE_USAGE,
        EDIT_USAGE,
        CLEAR_USAGE,
        FIND_USAGE,
        LIST_USAGE,
        VIEW_USAGE,
        VIEW_ALL_USAGE,
        UNDO_USAGE,
        HELP_USAGE,
        EXIT_USAGE,
    ]
    .join("\n\n")
}

/// Wrap a usage text in the invalid-format message.
pub fn invalid_format(usage: &str) -> String {
    format!("{MESSAGE_INVALID_COMMAND_FORMAT}{usage}")
}

/// Summary line for a displayed listing.
pub fn tasks_listed_summary(tasks: &[Task]) -> String {
    format!("{} tasks listed!", tasks.len())
}

/// Outcome of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Message for the user.
    pub feedback: String,
    /// Tasks to display, present only for listing commands.
    pub relevant_tasks: Option<Vec<Task>>,
    /// Set by `exit`; the hosting loop stops when it sees this.
    pub exit: bool,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        CommandResult {
            feedback: feedback.into(),
            relevant_tasks: None,
            exit: false,
        }
    }

    pub fn with_tasks(feedback: impl Into<String>, tasks: Vec<Task>) -> Self {
        CommandResult {
            feedback: feedback.into(),
            relevant_tasks: Some(tasks),
            exit: false,
        }
    }

    fn exit(feedback: impl Into<String>) -> Self {
        CommandResult {
            feedback: feedback.into(),
            relevant_tasks: None,
            exit: true,
        }
    }
}

/// Session state a command runs against.
pub struct Context<'a> {
    pub tasks: &'a mut TaskList,
    pub last_shown: &'a [Task],
    pub journal: &'a mut UndoJournal,
    /// Raw line that produced the command, recorded with each reversal.
    pub input: &'a str,
}

/// One parsed user operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { task: Task },
    Delete { index: i64 },
    Edit { index: i64, task: Task },
    Clear,
    Find { keywords: BTreeSet<String> },
    List,
    View { index: i64 },
    ViewAll { index: i64 },
    Undo { previous: String },
    Help,
    Exit,
    Incorrect { message: String },
}

impl Command {
    pub fn incorrect(message: impl Into<String>) -> Self {
        Command::Incorrect {
            message: message.into(),
        }
    }

    /// Whether running this command can change the collection.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Delete { .. }
                | Command::Edit { .. }
                | Command::Clear
                | Command::Undo { .. }
        )
    }

    /// The command word this variant answers to.
    pub fn word(&self) -> &'static str {
        match self {
            Command::Add { .. } => ADD_WORD,
            Command::Delete { .. } => DELETE_WORD,
            Command::Edit { .. } => EDIT_WORD,
            Command::Clear => CLEAR_WORD,
            Command::Find { .. } => FIND_WORD,
            Command::List => LIST_WORD,
            Command::View { .. } => VIEW_WORD,
            Command::ViewAll { .. } => VIEW_ALL_WORD,
            Command::Undo { .. } => UNDO_WORD,
            Command::Help => HELP_WORD,
            Command::Exit => EXIT_WORD,
            Command::Incorrect { .. } => "incorrect",
        }
    }

    pub fn execute(self, ctx: Context<'_>) -> CommandResult {
        match self {
            Command::Add { task } => cmd_add(ctx, task),
            Command::Delete { index } => cmd_delete(ctx, index),
            Command::Edit { index, task } => cmd_edit(ctx, index, task),
            Command::Clear => cmd_clear(ctx),
            Command::Find { keywords } => cmd_find(ctx.tasks, &keywords),
            Command::List => cmd_list(ctx.tasks),
            Command::View { index } => cmd_view(&ctx, index, Task::as_text_hide_legacy),
            Command::ViewAll { index } => cmd_view(&ctx, index, Task::as_text_show_all),
            Command::Undo { previous } => cmd_undo(ctx, &previous),
            Command::Help => CommandResult::new(all_usages()),
            Command::Exit => CommandResult::exit(MESSAGE_EXIT_ACKNOWLEDGEMENT),
            Command::Incorrect { message } => CommandResult::new(message),
        }
    }
}

/// Resolve a 1-based displayed index against the last shown list.
fn resolve_index(last_shown: &[Task], index: i64) -> Result<&Task, CommandResult> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| last_shown.get(i))
        .ok_or_else(|| CommandResult::new(MESSAGE_INVALID_TASK_DISPLAYED_INDEX))
}

fn cmd_add(ctx: Context<'_>, task: Task) -> CommandResult {
    let feedback = format!("{MESSAGE_ADD_SUCCESS}{task}");
    ctx.tasks.add(task);
    ctx.journal.push(
        ctx.input,
        Reversal::RemoveAt {
            position: ctx.tasks.len() - 1,
        },
    );
    CommandResult::new(feedback)
}

fn cmd_delete(ctx: Context<'_>, index: i64) -> CommandResult {
    let target = match resolve_index(ctx.last_shown, index) {
        Ok(t) => t,
        Err(result) => return result,
    };
    match ctx.tasks.remove(target) {
        Ok(position) => {
            ctx.journal.push(
                ctx.input,
                Reversal::InsertAt {
                    position,
                    task: target.clone(),
                },
            );
            CommandResult::new(format!("{MESSAGE_DELETE_SUCCESS}{target}"))
        }
        Err(e) => CommandResult::new(e.to_string()),
    }
}

fn cmd_edit(ctx: Context<'_>, index: i64, task: Task) -> CommandResult {
    let target = match resolve_index(ctx.last_shown, index) {
        Ok(t) => t,
        Err(result) => return result,
    };
    let feedback = format!("{MESSAGE_EDIT_SUCCESS}{task}");
    match ctx.tasks.replace(target, task) {
        Ok((position, old)) => {
            ctx.journal
                .push(ctx.input, Reversal::ReplaceAt { position, task: old });
            CommandResult::new(feedback)
        }
        Err(e) => CommandResult::new(e.to_string()),
    }
}

fn cmd_clear(ctx: Context<'_>) -> CommandResult {
    let previous = ctx.tasks.clear();
    ctx.journal
        .push(ctx.input, Reversal::Restore { tasks: previous });
    CommandResult::new(MESSAGE_CLEAR_SUCCESS)
}

fn cmd_find(tasks: &TaskList, keywords: &BTreeSet<String>) -> CommandResult {
    let wanted: BTreeSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let found: Vec<Task> = tasks
        .iter()
        .filter(|t| t.words().any(|w| wanted.contains(&w.to_lowercase())))
        .cloned()
        .collect();
    CommandResult::with_tasks(tasks_listed_summary(&found), found)
}

fn cmd_list(tasks: &TaskList) -> CommandResult {
    let all = tasks.as_slice().to_vec();
    CommandResult::with_tasks(tasks_listed_summary(&all), all)
}

fn cmd_view(ctx: &Context<'_>, index: i64, render: fn(&Task) -> String) -> CommandResult {
    let target = match resolve_index(ctx.last_shown, index) {
        Ok(t) => t,
        Err(result) => return result,
    };
    if !ctx.tasks.contains(target) {
        return CommandResult::new(MESSAGE_TASK_NOT_IN_TASKSLIST);
    }
    CommandResult::new(format!("{MESSAGE_VIEW_TASK_DETAILS}{}", render(target)))
}

fn cmd_undo(ctx: Context<'_>, previous: &str) -> CommandResult {
    let Some(entry) = ctx.journal.pop() else {
        return CommandResult::new(MESSAGE_NOTHING_TO_UNDO);
    };
    debug!(previous, reverted = %entry.input, "reverting last change");
    entry.reversal.apply(ctx.tasks);
    CommandResult::new(format!("{MESSAGE_UNDO_SUCCESS}{}", entry.input))
}
