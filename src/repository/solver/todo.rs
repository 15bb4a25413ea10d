//! Work list
//!
//! A LIFO of pending tasks. A task that discovers missing children pushes
//! itself back first and its sub-tasks after, so popping from the back
//! resolves the children before the parent is retried. This replaces the
//! call stack: deep histories and wide trees drain in constant stack
//! space.

use anyhow::Result;

use super::SizeSolver;
use super::task::Task;
use crate::repository::store::ObjectStore;

#[derive(Default)]
pub(crate) struct ToDoList {
    tasks: Vec<Task>,
}

impl ToDoList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Append another list's tasks, preserving their order.
    pub(crate) fn push_all(&mut self, other: &mut ToDoList) {
        self.tasks.append(&mut other.tasks);
    }

    /// Pop and dispatch until the list is empty. Tasks may push more work
    /// while running.
    pub(crate) fn run<S: ObjectStore>(&mut self, solver: &mut SizeSolver<S>) -> Result<()> {
        while let Some(task) = self.tasks.pop() {
            task.run(solver, self)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    pub(crate) fn pop(&mut self) -> Option<Task> {
        self.tasks.pop()
    }
}
