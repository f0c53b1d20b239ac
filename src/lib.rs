//! # Keyboard Warrior
//!
//! A line-oriented command interpreter for a personal task list. A user types a
//! single line, the parser classifies it into one operation, and the interpreter
//! runs it against the in-memory task collection, persisting after every change.
//!
//! ## Commands
//!
//! - `add <details>` - append a task
//! - `delete <index>` / `edit <index> <details>` - act on the last listing
//! - `clear` - remove everything
//! - `find <keyword>...` / `list` - display tasks with 1-based indices
//! - `view <index>` / `viewall <index>` - show one task
//! - `undo` - revert the most recent change
//! - `help` / `exit`
//!
//! Data is stored in `~/.keyboard_warrior/tasks.json` unless `--data-file` says otherwise.

pub mod cli;
pub mod cmd;
pub mod db;
pub mod history;
pub mod logic;
pub mod parser;
pub mod shell;
pub mod storage;
pub mod task;

pub use cmd::{Command, CommandResult};
pub use db::TaskList;
pub use logic::{Logic, LogicError};
pub use storage::{JsonStorage, Storage, StorageError};
pub use task::{Task, TaskError};
