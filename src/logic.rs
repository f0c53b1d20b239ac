//! The interpreter: parses a raw line, runs the command, keeps session state.
//!
//! `Logic` owns everything a session mutates: the task collection, the last
//! shown list, the raw input history and the undo journal. Nothing here is
//! shared between instances, so independent sessions never see each other.

use thiserror::Error;
use tracing::{debug, error};

use crate::cmd::{CommandResult, Context};
use crate::db::TaskList;
use crate::history::{InputHistory, UndoJournal};
use crate::parser::parse_command;
use crate::storage::{Storage, StorageError};
use crate::task::Task;

/// Failures that prevent a command from completing.
#[derive(Debug, Error)]
pub enum LogicError {
    /// The command ran, but persisting its effect failed. The in-memory change
    /// is kept.
    #[error("Failed to save task list: {0}")]
    Storage(#[from] StorageError),
}

/// One interpreter session.
pub struct Logic<S: Storage> {
    storage: S,
    tasks: TaskList,
    last_shown: Vec<Task>,
    history: InputHistory,
    journal: UndoJournal,
}

impl<S: Storage> Logic<S> {
    /// Start a session over an already loaded collection.
    pub fn new(storage: S, tasks: TaskList) -> Self {
        Logic {
            storage,
            tasks,
            last_shown: Vec::new(),
            history: InputHistory::new(),
            journal: UndoJournal::new(),
        }
    }

    /// Start a session from whatever `storage` holds.
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let tasks = storage.load()?;
        Ok(Self::new(storage, tasks))
    }

    /// Parse and run one raw input line.
    ///
    /// Mutating commands are persisted before returning; listing commands
    /// replace the last shown list.
    pub fn execute(&mut self, raw: &str) -> Result<CommandResult, LogicError> {
        let command = parse_command(raw, &mut self.history);
        let word = command.word();
        let mutating = command.is_mutating();

        let result = command.execute(Context {
            tasks: &mut self.tasks,
            last_shown: &self.last_shown,
            journal: &mut self.journal,
            input: raw,
        });
        debug!(command = word, mutating, feedback = %result.feedback, "executed");

        if mutating {
            if let Err(e) = self.storage.save(&self.tasks) {
                error!(command = word, "persisting task list failed: {e}");
                return Err(e.into());
            }
        }
        if let Some(shown) = &result.relevant_tasks {
            self.last_shown = shown.clone();
        }
        Ok(result)
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn last_shown_list(&self) -> &[Task] {
        &self.last_shown
    }

    /// Replace the index space used by index-addressed commands.
    pub fn set_last_shown_list(&mut self, tasks: Vec<Task>) {
        self.last_shown = tasks;
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::cmd::*;
    use crate::storage::JsonStorage;

    /// Records the last saved collection; can be told to fail.
    #[derive(Default)]
    struct MemoryStorage {
        saved: RefCell<Option<TaskList>>,
        saves: Cell<usize>,
        fail: Cell<bool>,
    }

    impl Storage for MemoryStorage {
        fn load(&self) -> Result<TaskList, StorageError> {
            Ok(self.saved.borrow().clone().unwrap_or_default())
        }

        fn save(&self, tasks: &TaskList) -> Result<(), StorageError> {
            if self.fail.get() {
                return Err(StorageError::Write {
                    path: PathBuf::from("memory"),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                });
            }
            self.saves.set(self.saves.get() + 1);
            *self.saved.borrow_mut() = Some(tasks.clone());
            Ok(())
        }
    }

    fn task(s: &str) -> Task {
        Task::new(s).unwrap()
    }

    fn tasks(items: &[&str]) -> Vec<Task> {
        items.iter().map(|s| task(s)).collect()
    }

    fn logic_with(items: &[&str]) -> Logic<MemoryStorage> {
        Logic::new(MemoryStorage::default(), TaskList::new(tasks(items)))
    }

    /// Run `input` and check the message, the displayed list, the collection,
    /// and the last shown list.
    fn assert_command_behavior(
        logic: &mut Logic<MemoryStorage>,
        input: &str,
        expected_message: &str,
        expected_tasks: &[Task],
        expected_shown: Option<&[Task]>,
        expected_last_shown: &[Task],
    ) {
        let r = logic.execute(input).unwrap();
        assert_eq!(r.feedback, expected_message);
        assert_eq!(r.relevant_tasks.as_deref(), expected_shown);
        assert_eq!(logic.tasks().as_slice(), expected_tasks);
        assert_eq!(logic.last_shown_list(), expected_last_shown);
    }

    fn assert_invalid_index_behavior(word: &str, rest: &str) {
        let shown = tasks(&["Task 1", "Task 2"]);
        let mut logic = logic_with(&["Task 1", "Task 2"]);
        logic.set_last_shown_list(shown.clone());
        for idx in ["-1", "0", "3"] {
            assert_command_behavior(
                &mut logic,
                &format!("{word} {idx}{rest}"),
                MESSAGE_INVALID_TASK_DISPLAYED_INDEX,
                &shown,
                None,
                &shown,
            );
        }
        assert_eq!(logic.execute("undo").unwrap().feedback, MESSAGE_NOTHING_TO_UNDO);
    }

    #[test]
    fn test_execute_invalid() {
        let mut logic = logic_with(&[]);
        let msg = invalid_format(HELP_USAGE);
        assert_command_behavior(&mut logic, "       ", &msg, &[], None, &[]);
    }

    #[test]
    fn test_execute_unknown_command_word() {
        let mut logic = logic_with(&["Task 1"]);
        assert_command_behavior(&mut logic, "xyzzy", &all_usages(), &tasks(&["Task 1"]), None, &[]);
        assert_eq!(logic.storage().saves.get(), 0);
    }

    #[test]
    fn test_execute_help_and_exit() {
        let mut logic = logic_with(&[]);
        assert_command_behavior(&mut logic, "help", &all_usages(), &[], None, &[]);
        let r = logic.execute("exit").unwrap();
        assert!(r.exit);
        assert_eq!(r.feedback, MESSAGE_EXIT_ACKNOWLEDGEMENT);
    }

    #[test]
    fn test_execute_clear() {
        let mut logic = logic_with(&["Task 1", "Task 2", "Task 3"]);
        assert_command_behavior(&mut logic, "clear", MESSAGE_CLEAR_SUCCESS, &[], None, &[]);
        assert_eq!(logic.storage().saved.borrow().as_ref(), Some(&TaskList::default()));

        assert_command_behavior(&mut logic, "clear", MESSAGE_CLEAR_SUCCESS, &[], None, &[]);
    }

    #[test]
    fn test_execute_add_successful() {
        let mut logic = logic_with(&[]);
        assert_command_behavior(
            &mut logic,
            "add This is a task",
            "New item added: This is a task",
            &tasks(&["This is a task"]),
            None,
            &[],
        );
        assert_eq!(
            logic.storage().saved.borrow().as_ref(),
            Some(&TaskList::new(tasks(&["This is a task"])))
        );
    }

    #[test]
    fn test_execute_add_invalid_format() {
        let mut logic = logic_with(&[]);
        let msg = invalid_format(ADD_USAGE);
        assert_command_behavior(&mut logic, "add   ", &msg, &[], None, &[]);
        assert_command_behavior(&mut logic, "add call p/12345", &msg, &[], None, &[]);
    }

    #[test]
    fn test_add_then_list_scenario() {
        let mut logic = logic_with(&[]);
        logic.execute("add Task 1").unwrap();
        logic.execute("add Task 2").unwrap();
        let expected = tasks(&["Task 1", "Task 2"]);
        assert_command_behavior(
            &mut logic,
            "list",
            "2 tasks listed!",
            &expected,
            Some(&expected[..]),
            &expected,
        );
    }

    #[test]
    fn test_execute_delete_invalid_args_format() {
        let mut logic = logic_with(&[]);
        let msg = invalid_format(DELETE_USAGE);
        assert_command_behavior(&mut logic, "delete ", &msg, &[], None, &[]);
        assert_command_behavior(&mut logic, "delete arg not number", &msg, &[], None, &[]);
    }

    #[test]
    fn test_execute_index_commands_invalid_index() {
        assert_invalid_index_behavior("delete", "");
        assert_invalid_index_behavior("view", "");
        assert_invalid_index_behavior("viewall", "");
        assert_invalid_index_behavior("edit", " new details");
    }

    #[test]
    fn test_execute_delete_removes_correct_task() {
        let three = tasks(&["Task 1", "Task 2", "Task 3"]);
        let mut logic = logic_with(&["Task 1", "Task 2", "Task 3"]);
        logic.set_last_shown_list(three.clone());
        assert_command_behavior(
            &mut logic,
            "delete 2",
            "Deleted Item: Task 2",
            &tasks(&["Task 1", "Task 3"]),
            None,
            &three,
        );
    }

    #[test]
    fn test_execute_delete_missing_in_task_list() {
        let three = tasks(&["Task 1", "Task 2", "Task 3"]);
        let mut logic = logic_with(&["Task 1", "Task 3"]);
        logic.set_last_shown_list(three.clone());
        assert_command_behavior(
            &mut logic,
            "delete 2",
            MESSAGE_TASK_NOT_IN_TASKSLIST,
            &tasks(&["Task 1", "Task 3"]),
            None,
            &three,
        );
    }

    #[test]
    fn test_delete_twice_from_same_listing_is_stale() {
        let mut logic = logic_with(&["Task 1", "Task 2"]);
        logic.execute("list").unwrap();
        assert_eq!(logic.execute("delete 1").unwrap().feedback, "Deleted Item: Task 1");
        assert_eq!(logic.execute("delete 1").unwrap().feedback, MESSAGE_TASK_NOT_IN_TASKSLIST);
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task 2"])[..]);
    }

    #[test]
    fn test_execute_edit() {
        let mut logic = logic_with(&["Task 1", "Task 2", "Task 3"]);
        logic.execute("list").unwrap();
        let shown = tasks(&["Task 1", "Task 2", "Task 3"]);
        assert_command_behavior(
            &mut logic,
            "edit 2 Task two, revised",
            "Edited Item: Task two, revised",
            &tasks(&["Task 1", "Task two, revised", "Task 3"]),
            None,
            &shown,
        );
        assert_command_behavior(
            &mut logic,
            "edit x y",
            &invalid_format(EDIT_USAGE),
            &tasks(&["Task 1", "Task two, revised", "Task 3"]),
            None,
            &shown,
        );
    }

    #[test]
    fn test_execute_view_and_view_all() {
        let legacy = Task::with_legacy("Task 1", None, Some("a@b.c".into()), None).unwrap();
        let mut logic = Logic::new(MemoryStorage::default(), TaskList::new(vec![legacy.clone()]));
        logic.execute("list").unwrap();
        let shown = vec![legacy.clone()];
        assert_command_behavior(
            &mut logic,
            "view 1",
            "Viewing task: Task 1",
            &shown,
            None,
            &shown,
        );
        assert_command_behavior(
            &mut logic,
            "viewall 1",
            "Viewing task: Task 1 Email: a@b.c",
            &shown,
            None,
            &shown,
        );
    }

    #[test]
    fn test_execute_find_only_matches_full_words() {
        let all = tasks(&["KE Y", "bla bla KEY bla", "KEYKEYKEY sduauo", "bla KEY bla bceofeia"]);
        let expected = tasks(&["bla bla KEY bla", "bla KEY bla bceofeia"]);
        let mut logic = logic_with(&[
            "KE Y",
            "bla bla KEY bla",
            "KEYKEYKEY sduauo",
            "bla KEY bla bceofeia",
        ]);
        assert_command_behavior(
            &mut logic,
            "find KEY",
            &tasks_listed_summary(&expected),
            &all,
            Some(&expected[..]),
            &expected,
        );
    }

    #[test]
    fn test_execute_find_is_non_case_sensitive() {
        let items = ["key key", "bla bla KEY bla", "KEy sduauo", "bla KEY bla bceofeia"];
        let all = tasks(&items);
        let mut logic = logic_with(&items);
        assert_command_behavior(
            &mut logic,
            "find KEY",
            "4 tasks listed!",
            &all,
            Some(&all[..]),
            &all,
        );
    }

    #[test]
    fn test_execute_find_matches_if_any_keyword_present() {
        let items = ["key key", "bla bla KEY bla", "nothing here", "bla rAnDoM bla bceofeia"];
        let all = tasks(&items);
        let expected = tasks(&["key key", "bla bla KEY bla", "bla rAnDoM bla bceofeia"]);
        let mut logic = logic_with(&items);
        assert_command_behavior(
            &mut logic,
            "find KEY random",
            "3 tasks listed!",
            &all,
            Some(&expected[..]),
            &expected,
        );
    }

    #[test]
    fn test_find_invalid_args_format() {
        let mut logic = logic_with(&[]);
        assert_command_behavior(&mut logic, "find ", &invalid_format(FIND_USAGE), &[], None, &[]);
    }

    #[test]
    fn test_undo_reverts_each_kind_of_change() {
        let mut logic = logic_with(&["Task 1", "Task 2"]);
        logic.execute("list").unwrap();

        logic.execute("add Task 3").unwrap();
        logic.execute("delete 1").unwrap();
        logic.execute("edit 2 Task two").unwrap();
        logic.execute("clear").unwrap();
        assert!(logic.tasks().is_empty());

        assert_eq!(logic.execute("undo").unwrap().feedback, "Undone: clear");
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task two", "Task 3"])[..]);

        assert_eq!(logic.execute("undo").unwrap().feedback, "Undone: edit 2 Task two");
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task 2", "Task 3"])[..]);

        assert_eq!(logic.execute("undo").unwrap().feedback, "Undone: delete 1");
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task 1", "Task 2", "Task 3"])[..]);

        assert_eq!(logic.execute("undo").unwrap().feedback, "Undone: add Task 3");
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task 1", "Task 2"])[..]);

        assert_eq!(
            logic.storage().saved.borrow().as_ref(),
            Some(&TaskList::new(tasks(&["Task 1", "Task 2"])))
        );
    }

    #[test]
    fn test_undo_skips_failed_and_read_only_commands() {
        let mut logic = logic_with(&[]);
        logic.execute("add Task 1").unwrap();
        logic.execute("list").unwrap();
        logic.execute("delete 9").unwrap();
        assert_eq!(logic.execute("undo").unwrap().feedback, "Undone: add Task 1");
        assert!(logic.tasks().is_empty());
    }

    #[test]
    fn test_undo_with_insufficient_history() {
        let mut logic = logic_with(&["Task 1"]);
        let shown = tasks(&["Task 1"]);
        assert_command_behavior(&mut logic, "undo", MESSAGE_NOTHING_TO_UNDO, &shown, None, &[]);
        logic.execute("list").unwrap();
        assert_command_behavior(&mut logic, "undo", MESSAGE_NOTHING_TO_UNDO, &shown, None, &shown);
    }

    #[test]
    fn test_persistence_failure_is_reported_without_rollback() {
        let mut logic = logic_with(&[]);
        logic.storage().fail.set(true);
        let err = logic.execute("add Task 1").unwrap_err();
        assert!(matches!(err, LogicError::Storage(StorageError::Write { .. })));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(logic.tasks().as_slice(), &tasks(&["Task 1"])[..]);

        logic.storage().fail.set(false);
        assert_eq!(logic.execute("list").unwrap().feedback, "1 tasks listed!");
    }

    #[test]
    fn test_read_only_commands_do_not_persist() {
        let mut logic = logic_with(&["Task 1"]);
        for input in ["list", "find Task", "view 1", "viewall 1", "help", "exit", "bogus"] {
            logic.execute(input).unwrap();
        }
        assert_eq!(logic.storage().saves.get(), 0);
        logic.execute("add Task 2").unwrap();
        assert_eq!(logic.storage().saves.get(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = logic_with(&[]);
        let mut b = logic_with(&[]);
        a.execute("add Task 1").unwrap();
        assert_eq!(b.execute("undo").unwrap().feedback, MESSAGE_NOTHING_TO_UNDO);
        assert_eq!(a.tasks().len(), 1);
    }

    #[test]
    fn test_load_from_json_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        {
            let mut logic = Logic::load(JsonStorage::new(&path)).unwrap();
            logic.execute("add Task 1").unwrap();
            logic.execute("add Task 2").unwrap();
        }
        let mut logic = Logic::load(JsonStorage::new(&path)).unwrap();
        let r = logic.execute("list").unwrap();
        assert_eq!(r.relevant_tasks, Some(tasks(&["Task 1", "Task 2"])));
    }
}
