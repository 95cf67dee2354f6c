//! Storage trait definitions.

use async_trait::async_trait;

use crate::entities::Task;
use crate::errors::TasksResult;

/// Persistence collaborator for the task list
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get storage type identifier
    fn storage_type(&self) -> &'static str;

    /// Persist the full task list, replacing previous contents
    async fn save(&self, tasks: &[Task]) -> TasksResult<()>;

    /// Load the task list; empty when nothing has been saved yet
    async fn load(&self) -> TasksResult<Vec<Task>>;
}
