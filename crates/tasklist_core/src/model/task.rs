use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Task {
    pub fn new(id: u64, title: &str, description: &str, created_at: String) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Moves the task to `completed`, stamping or clearing `completed_at`.
    /// Returns whether anything changed.
    pub fn mark(&mut self, completed: bool, now: &str) -> bool {
        if self.completed == completed {
            return false;
        }

        self.completed = completed;
        self.completed_at = if completed {
            Some(now.to_string())
        } else {
            None
        };
        true
    }
}
