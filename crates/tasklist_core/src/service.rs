use crate::error::AppError;
use crate::model::{Task, TaskStats};
use crate::store::{TaskChanges, TaskStore};

/// Result of a complete/uncomplete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub task: Task,
    /// False when the task was already in the requested state.
    pub changed: bool,
}

pub struct TaskService {
    store: TaskStore,
}

pub fn parse_id(raw: &str) -> Result<u64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("task id is required"));
    }

    match trimmed.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::invalid_input(format!(
            "'{trimmed}' is not a valid task id"
        ))),
    }
}

impl TaskService {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn add(&mut self, title: &str, description: &str) -> Result<Task, AppError> {
        self.store.add(title, description)
    }

    pub fn list_all(&self) -> Vec<Task> {
        self.store.list_all().to_vec()
    }

    pub fn list_pending(&self) -> Vec<Task> {
        self.store.list_pending()
    }

    pub fn list_completed(&self) -> Vec<Task> {
        self.store.list_completed()
    }

    pub fn show(&self, id: &str) -> Result<Task, AppError> {
        let id = parse_id(id)?;
        self.store.find_by_id(id).cloned()
    }

    /// `None` keeps the current value. At least one field must be given.
    pub fn update(
        &mut self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let id = parse_id(id)?;
        let changes = TaskChanges {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        };
        if changes.is_empty() {
            return Err(AppError::invalid_input("nothing to update"));
        }

        self.store.update(id, changes)
    }

    pub fn complete(&mut self, id: &str) -> Result<StatusChange, AppError> {
        self.set_completed(id, true)
    }

    pub fn uncomplete(&mut self, id: &str) -> Result<StatusChange, AppError> {
        self.set_completed(id, false)
    }

    fn set_completed(&mut self, id: &str, completed: bool) -> Result<StatusChange, AppError> {
        let id = parse_id(id)?;
        let was = self.store.find_by_id(id)?.completed;
        let task = self.store.set_completed(id, completed)?;

        Ok(StatusChange {
            changed: was != completed,
            task,
        })
    }

    pub fn delete(&mut self, id: &str) -> Result<Task, AppError> {
        let id = parse_id(id)?;
        self.store.delete(id)
    }

    pub fn stats(&self) -> TaskStats {
        self.store.stats()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    /// Writes any changes a failed save left behind.
    pub fn flush(&mut self) -> Result<(), AppError> {
        self.store.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskService, parse_id};
    use crate::storage::MemoryStorage;
    use crate::store::TaskStore;

    fn service() -> (TaskService, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(Box::new(storage.clone()));
        store.load().unwrap();
        (TaskService::new(store), storage)
    }

    #[test]
    fn parse_id_accepts_padded_numbers() {
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
    }

    #[test]
    fn parse_id_rejects_non_numeric_zero_and_negative() {
        for raw in ["", "  ", "abc", "0", "-3", "1.5", "2x"] {
            let err = parse_id(raw).unwrap_err();
            assert_eq!(err.code(), "invalid_input", "input {raw:?}");
        }
    }

    #[test]
    fn non_numeric_id_never_reaches_store() {
        let (mut service, storage) = service();
        service.add("demo", "").unwrap();
        let saves = storage.save_count();

        assert_eq!(service.complete("one").unwrap_err().code(), "invalid_input");
        assert_eq!(service.delete("").unwrap_err().code(), "invalid_input");
        assert_eq!(storage.save_count(), saves);
    }

    #[test]
    fn update_without_fields_is_invalid_input() {
        let (mut service, _) = service();
        service.add("demo", "").unwrap();

        let err = service.update("1", None, None).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "nothing to update");
    }

    #[test]
    fn update_applies_partial_changes() {
        let (mut service, _) = service();
        service.add("Buy milk", "").unwrap();

        let updated = service.update("1", None, Some("oat")).unwrap();

        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description, "oat");
    }

    #[test]
    fn complete_reports_whether_state_changed() {
        let (mut service, _) = service();
        service.add("demo", "").unwrap();

        let first = service.complete("1").unwrap();
        assert!(first.changed);
        assert!(first.task.completed);

        let second = service.complete("1").unwrap();
        assert!(!second.changed);
        assert_eq!(second.task.completed_at, first.task.completed_at);

        let undone = service.uncomplete("1").unwrap();
        assert!(undone.changed);
        assert_eq!(undone.task.completed_at, None);

        let again = service.uncomplete("1").unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn missing_task_is_not_found() {
        let (mut service, _) = service();

        assert_eq!(service.show("4").unwrap_err().code(), "not_found");
        assert_eq!(service.uncomplete("4").unwrap_err().code(), "not_found");
        assert_eq!(service.delete("4").unwrap_err().code(), "not_found");
    }

    #[test]
    fn flush_writes_after_failed_save() {
        let (mut service, storage) = service();
        storage.fail_saves(true);

        assert_eq!(service.add("demo", "").unwrap_err().code(), "storage_write");
        assert!(service.has_unsaved_changes());

        storage.fail_saves(false);
        service.flush().unwrap();

        assert!(!service.has_unsaved_changes());
        assert_eq!(storage.saved_tasks().len(), 1);
    }

    #[test]
    fn end_to_end_through_service() {
        let (mut service, _) = service();

        assert_eq!(service.add("Buy milk", "").unwrap().id, 1);
        assert_eq!(service.add("Write report", "due Friday").unwrap().id, 2);
        service.complete("1").unwrap();

        let pending: Vec<u64> = service.list_pending().iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![2]);

        service.delete("2").unwrap();
        let all: Vec<u64> = service.list_all().iter().map(|t| t.id).collect();
        assert_eq!(all, vec![1]);

        let stats = service.stats();
        assert_eq!((stats.total, stats.completed, stats.pending), (1, 1, 0));
        assert_eq!(stats.completion_rate, 1.0);
    }
}
