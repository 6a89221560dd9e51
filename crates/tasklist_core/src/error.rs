use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("corrupt_storage - {0}")]
    CorruptStorage(String),
    #[error("storage_write - {0}")]
    StorageWrite(String),
    #[error("io_error - {0}")]
    Io(String),
    #[error("invalid_config - {0}")]
    InvalidConfig(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(id: u64) -> Self {
        Self::NotFound(format!("task {id} not found"))
    }

    pub fn corrupt_storage<M: Into<String>>(message: M) -> Self {
        Self::CorruptStorage(message.into())
    }

    pub fn storage_write<M: Into<String>>(message: M) -> Self {
        Self::StorageWrite(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn invalid_config<M: Into<String>>(message: M) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::CorruptStorage(_) => "corrupt_storage",
            Self::StorageWrite(_) => "storage_write",
            Self::Io(_) => "io_error",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::NotFound(message)
            | Self::CorruptStorage(message)
            | Self::StorageWrite(message)
            | Self::Io(message)
            | Self::InvalidConfig(message) => message,
        }
    }

    /// Text shown to a person at the interactive prompt.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => format!("Invalid input: {message}"),
            Self::NotFound(message) => format!("Not found: {message}"),
            Self::CorruptStorage(message) => {
                format!("Task file could not be loaded: {message}")
            }
            Self::StorageWrite(message) => format!(
                "Could not save tasks: {message}. Changes are kept in memory and will be saved on the next successful write."
            ),
            Self::Io(message) => format!("I/O error: {message}"),
            Self::InvalidConfig(message) => format!("Configuration problem: {message}"),
        }
    }

    /// Errors after which the menu loop cannot sensibly continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptStorage(_))
    }
}
