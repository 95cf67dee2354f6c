//! JSON file storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::traits::TaskRepository;
use crate::entities::Task;
use crate::errors::{TasksError, TasksResult};

/// Stores the task list as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tasks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, e: &std::io::Error) -> TasksError {
        TasksError::FileWriteError {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl TaskRepository for JsonFileRepository {
    fn storage_type(&self) -> &'static str {
        "json-file"
    }

    async fn save(&self, tasks: &[Task]) -> TasksResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(&e))?;
        }

        let content = serde_json::to_string_pretty(tasks)?;

        // Write beside the target and rename so a failed write keeps the old list
        let staging = self.staging_path();
        fs::write(&staging, content)
            .await
            .map_err(|e| self.write_error(&e))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.write_error(&e))?;

        debug!(path = %self.path.display(), count = tasks.len(), "Saved tasks");
        Ok(())
    }

    async fn load(&self) -> TasksResult<Vec<Task>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => {
                let tasks: Vec<Task> = serde_json::from_str(&content)?;
                debug!(path = %self.path.display(), count = tasks.len(), "Loaded tasks");
                Ok(tasks)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(TasksError::FileReadError {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
