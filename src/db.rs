//! The task collection and display helpers.
//!
//! `TaskList` is the single authoritative, ordered collection of tasks for a
//! session. Insertion order is display order. Duplicates by value are allowed;
//! removal and replacement act on the first structurally equal element.

use thiserror::Error;

use crate::task::Task;

/// The referenced task is no longer part of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Task could not be found in Keyboard Warrior")]
pub struct TaskNotFound;

/// Ordered, mutable collection of tasks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskList { tasks }
    }

    /// Append a task at the end.
    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Position of the first task equal to `task`.
    pub fn position(&self, task: &Task) -> Option<usize> {
        self.tasks.iter().position(|t| t == task)
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.position(task).is_some()
    }

    /// Remove the first task equal to `task`, returning its former position.
    pub fn remove(&mut self, task: &Task) -> Result<usize, TaskNotFound> {
        let idx = self.position(task).ok_or(TaskNotFound)?;
        self.tasks.remove(idx);
        Ok(idx)
    }

    /// Replace the first task equal to `target` with `replacement`, in place.
    /// Returns the position and the task that was replaced.
    pub fn replace(
        &mut self,
        target: &Task,
        replacement: Task,
    ) -> Result<(usize, Task), TaskNotFound> {
        let idx = self.position(target).ok_or(TaskNotFound)?;
        let old = std::mem::replace(&mut self.tasks[idx], replacement);
        Ok((idx, old))
    }

    /// Insert at `idx`, clamped to the end of the list.
    pub fn insert_at(&mut self, idx: usize, task: Task) {
        let idx = idx.min(self.tasks.len());
        self.tasks.insert(idx, task);
    }

    pub fn remove_at(&mut self, idx: usize) -> Option<Task> {
        (idx < self.tasks.len()).then(|| self.tasks.remove(idx))
    }

    pub fn set_at(&mut self, idx: usize, task: Task) -> Option<Task> {
        self.tasks
            .get_mut(idx)
            .map(|slot| std::mem::replace(slot, task))
    }

    /// Remove every task, handing back what was there.
    pub fn clear(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    /// Replace the whole contents.
    pub fn restore(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Read-only ordered view.
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        TaskList::new(tasks)
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Format tasks as a numbered table, numbering from 1 the way index-addressed
/// commands expect.
pub fn format_task_table(tasks: &[Task], width: usize) -> String {
    let mut out = String::new();
    for (i, t) in tasks.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", i + 1, truncate(&t.to_string(), width)));
    }
    out
}

/// Cut `s` down to `width` characters, the last of which becomes `…` when
/// anything was dropped.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    match width {
        0 => String::new(),
        _ => s.chars().take(width - 1).chain(Some('…')).collect(),
    }
}
