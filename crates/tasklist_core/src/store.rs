use crate::config::CorruptPolicy;
use crate::error::AppError;
use crate::model::{Task, TaskStats, timestamp};
use crate::storage::{TaskStorage, validate_tasks};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct TaskStore {
    storage: Box<dyn TaskStorage>,
    tasks: Vec<Task>,
    next_id: u64,
    dirty: bool,
}

/// A corrupt task file that was moved aside during [`TaskStore::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub reason: AppError,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl TaskStore {
    /// Creates an empty, unloaded store over `storage`.
    pub fn new(storage: Box<dyn TaskStorage>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            next_id: 1,
            dirty: false,
        }
    }

    /// Creates a store and loads it, applying `policy` if the data is corrupt.
    pub fn open(
        storage: Box<dyn TaskStorage>,
        policy: CorruptPolicy,
    ) -> Result<(Self, Option<Recovery>), AppError> {
        let mut store = Self::new(storage);

        match store.load() {
            Ok(()) => Ok((store, None)),
            Err(err @ AppError::CorruptStorage(_)) if policy == CorruptPolicy::StartEmpty => {
                let backup = store.storage.quarantine()?;
                warn!(
                    storage = %store.storage.describe(),
                    backup = ?backup,
                    error = %err,
                    "task data unreadable, starting with an empty list"
                );
                store.tasks.clear();
                store.next_id = 1;
                Ok((store, Some(Recovery { reason: err, backup })))
            }
            Err(err) => Err(err),
        }
    }

    pub fn load(&mut self) -> Result<(), AppError> {
        let tasks = self.storage.load()?;
        validate_tasks(&tasks)?;
        debug!(storage = %self.storage.describe(), count = tasks.len(), "task list loaded");
        self.next_id = tasks.iter().map(|task| task.id).max().map_or(1, |max| max + 1);
        self.tasks = tasks;
        self.dirty = false;
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        match self.storage.save(&self.tasks) {
            Ok(()) => {
                if self.dirty {
                    info!(storage = %self.storage.describe(), "pending changes written");
                }
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                warn!(storage = %self.storage.describe(), error = %err, "save failed, memory is ahead of disk");
                Err(err)
            }
        }
    }

    /// True while memory holds changes that have not reached the backend.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retries the save when there is something outstanding.
    pub fn sync(&mut self) -> Result<(), AppError> {
        if self.dirty { self.save() } else { Ok(()) }
    }

    pub fn storage_description(&self) -> String {
        self.storage.describe()
    }

    /// Id the next added task will get. Deleting tasks never lowers it.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn add(&mut self, title: &str, description: &str) -> Result<Task, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }

        let task = Task::new(self.next_id, title, description, timestamp::now()?);
        self.next_id += 1;
        self.tasks.push(task.clone());
        info!(id = task.id, "task added");
        self.save()?;

        Ok(task)
    }

    pub fn find_by_id(&self, id: u64) -> Result<&Task, AppError> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Task, AppError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    pub fn update(&mut self, id: u64, changes: TaskChanges) -> Result<Task, AppError> {
        let task = self.find_mut(id)?;
        let title = match changes.title.as_deref().map(str::trim) {
            Some("") => return Err(AppError::invalid_input("title cannot be empty")),
            other => other.map(str::to_string),
        };

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description.trim().to_string();
        }
        let updated = task.clone();

        info!(id, "task updated");
        self.save()?;
        Ok(updated)
    }

    pub fn set_completed(&mut self, id: u64, completed: bool) -> Result<Task, AppError> {
        let now = timestamp::now()?;
        let task = self.find_mut(id)?;
        let changed = task.mark(completed, &now);
        let updated = task.clone();

        if changed {
            info!(id, completed, "task status changed");
        } else {
            debug!(id, completed, "task already in requested state");
        }
        self.save()?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: u64) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))?;

        let removed = self.tasks.remove(index);
        info!(id, "task deleted");
        self.save()?;
        Ok(removed)
    }

    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn list_pending(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_pending())
            .cloned()
            .collect()
    }

    pub fn list_completed(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.completed)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }
}
