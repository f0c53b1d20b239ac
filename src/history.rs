//! Undo bookkeeping.
//!
//! Two records live here. `InputHistory` is the stack of raw input lines, pushed
//! once per parsed line; the undo command pops its own line and the one before
//! it. `UndoJournal` holds one `Reversal` per successful mutation and is what
//! actually puts the collection back.

use crate::db::TaskList;
use crate::task::Task;

/// Append-only stack of raw input lines.
#[derive(Debug, Default, Clone)]
pub struct InputHistory {
    inputs: Vec<String>,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, raw: &str) {
        self.inputs.push(raw.to_string());
    }

    /// Pop the just-recorded undo line, then pop and return the line before it.
    /// `None` when there was nothing before the undo line.
    pub fn take_undo_target(&mut self) -> Option<String> {
        self.inputs.pop();
        self.inputs.pop()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.inputs.last().map(String::as_str)
    }
}

/// Inverse of one mutation, expressed against collection positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reversal {
    /// Undo an add: drop the task appended at `position`.
    RemoveAt { position: usize },
    /// Undo a delete: put `task` back where it was.
    InsertAt { position: usize, task: Task },
    /// Undo an edit: restore the task that was replaced.
    ReplaceAt { position: usize, task: Task },
    /// Undo a clear: restore the whole previous contents.
    Restore { tasks: Vec<Task> },
}

impl Reversal {
    pub fn apply(self, tasks: &mut TaskList) {
        match self {
            Reversal::RemoveAt { position } => {
                tasks.remove_at(position);
            }
            Reversal::InsertAt { position, task } => tasks.insert_at(position, task),
            Reversal::ReplaceAt { position, task } => {
                tasks.set_at(position, task);
            }
            Reversal::Restore { tasks: previous } => tasks.restore(previous),
        }
    }
}

/// A reversal together with the raw line that caused the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub input: String,
    pub reversal: Reversal,
}

/// LIFO log of reversals, newest last.
#[derive(Debug, Default, Clone)]
pub struct UndoJournal {
    entries: Vec<JournalEntry>,
}

impl UndoJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: &str, reversal: Reversal) {
        self.entries.push(JournalEntry {
            input: input.to_string(),
            reversal,
        });
    }

    pub fn pop(&mut self) -> Option<JournalEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
