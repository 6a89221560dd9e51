use crate::error::AppError;
use crate::model::Task;
use std::collections::HashSet;
use std::path::PathBuf;

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStorage;
pub use memory::MemoryStorage;

pub trait TaskStorage {
    /// Reads the full task list. A backing that does not exist yet is an empty list.
    fn load(&self) -> Result<Vec<Task>, AppError>;

    /// Replaces the persisted list with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<(), AppError>;

    /// Human readable location, used in log lines and messages.
    fn describe(&self) -> String;

    /// Moves unreadable data out of the way so a fresh list can be written.
    /// Returns where it went, if anywhere.
    fn quarantine(&self) -> Result<Option<PathBuf>, AppError> {
        Ok(None)
    }
}

/// Checks the invariants every stored list must hold.
pub fn validate_tasks(tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(tasks.len());

    for task in tasks {
        if task.id == 0 {
            return Err(AppError::corrupt_storage("task id must be at least 1"));
        }

        if !seen.insert(task.id) {
            return Err(AppError::corrupt_storage(format!(
                "duplicate task id {}",
                task.id
            )));
        }

        if task.title.trim().is_empty() {
            return Err(AppError::corrupt_storage(format!(
                "task {} has an empty title",
                task.id
            )));
        }

        if task.completed != task.completed_at.is_some() {
            return Err(AppError::corrupt_storage(format!(
                "task {} completed flag does not match completed_at",
                task.id
            )));
        }
    }

    Ok(())
}
