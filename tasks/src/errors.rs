//! Error types for the smart-tasks crate.

use thiserror::Error;

/// Error types for task tracking, persistence and configuration
#[derive(Error, Debug, Clone)]
pub enum TasksError {
    // Task errors
    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    #[error("Task reference '{prefix}' is ambiguous ({matches} matches)")]
    AmbiguousTask { prefix: String, matches: usize },

    #[error("Invalid priority: '{priority}'")]
    InvalidPriority { priority: String },

    #[error("Invalid deadline '{input}': expected YYYY-MM-DD HH:MM")]
    InvalidDeadline { input: String },

    #[error("Invalid export format: '{format}'")]
    InvalidExportFormat { format: String },

    // Storage errors
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Failed to read file '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    FileWriteError { path: String, reason: String },

    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },

    // Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    // General errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl From<std::io::Error> for TasksError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TasksError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for tasks operations
pub type TasksResult<T> = Result<T, TasksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TasksError::TaskNotFound {
            task_id: "3f2a".to_string(),
        };
        assert_eq!(err.to_string(), "Task '3f2a' not found");
    }

    #[test]
    fn test_invalid_deadline_mentions_format() {
        let err = TasksError::InvalidDeadline {
            input: "tomorrow-ish".to_string(),
        };
        assert!(err.to_string().contains("YYYY-MM-DD HH:MM"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let tasks_err: TasksError = io_err.into();
        assert!(matches!(tasks_err, TasksError::StorageError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let tasks_err: TasksError = json_err.into();
        assert!(matches!(tasks_err, TasksError::JsonParseError { .. }));
    }
}
