use super::TaskStorage;
use crate::error::AppError;
use crate::model::Task;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    fail_saves: bool,
    saves: usize,
}

/// Volatile backing. Clones share the same state, so a test can keep a handle
/// after handing the storage to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let storage = Self::default();
        storage.state.borrow_mut().tasks = tasks;
        storage
    }

    /// Makes every following `save` fail until switched back.
    pub fn fail_saves(&self, fail: bool) {
        self.state.borrow_mut().fail_saves = fail;
    }

    pub fn saved_tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }
}

impl TaskStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.state.borrow().tasks.clone())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return Err(AppError::storage_write("memory storage rejected the write"));
        }

        state.tasks = tasks.to_vec();
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
