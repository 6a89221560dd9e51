use super::TaskStorage;
use crate::error::AppError;
use crate::model::Task;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::debug;

/// Task list stored as a pretty printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl TaskStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "task file missing, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let tasks: Vec<Task> = serde_json::from_slice(&content).map_err(|err| {
            AppError::corrupt_storage(format!("invalid JSON in {}: {}", self.path.display(), err))
        })?;

        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let write_error =
            |err: std::io::Error| AppError::storage_write(format!("{}: {}", self.path.display(), err));

        let parent = self.parent_dir();
        std::fs::create_dir_all(parent).map_err(write_error)?;

        let mut content = serde_json::to_string_pretty(tasks)
            .map_err(|err| AppError::storage_write(err.to_string()))?;
        content.push('\n');

        // Same directory as the target so the rename stays on one filesystem.
        let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
        temp.write_all(content.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(temp.path(), permissions).map_err(write_error)?;
        }

        temp.persist(&self.path)
            .map_err(|err| write_error(err.error))?;

        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn quarantine(&self) -> Result<Option<PathBuf>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut backup = self.path.clone().into_os_string();
        backup.push(format!(".corrupt-{}", OffsetDateTime::now_utc().unix_timestamp()));
        let backup = PathBuf::from(backup);

        std::fs::rename(&self.path, &backup).map_err(|err| {
            AppError::storage_write(format!(
                "could not move {} aside: {}",
                self.path.display(),
                err
            ))
        })?;

        Ok(Some(backup))
    }
}
