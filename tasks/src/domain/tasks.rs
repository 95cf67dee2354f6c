//! Tasks domain facade.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use tracing::info;

use super::stats::TaskStatistics;
use crate::entities::{Task, TaskPriority};
use crate::errors::{TasksError, TasksResult};
use crate::storage::TaskRepository;
use crate::store::{ChangeTracker, TaskListener, TaskStore};

/// Accepted local-time deadline layouts, besides RFC 3339
const DEADLINE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Parse deadline text typed by a user.
///
/// Accepts `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM` in local time, or a
/// full RFC 3339 timestamp.
pub fn parse_deadline(input: &str) -> TasksResult<DateTime<Utc>> {
    let trimmed = input.trim();
    let invalid = || TasksError::InvalidDeadline {
        input: input.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = DEADLINE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(invalid)?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// Fields for a new task, validated by [`TasksDomain::add_task`]
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

/// Partial edit; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    /// `Some(None)` clears the deadline
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

impl TaskEdit {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(category) = self.category {
            task.set_category(category);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

fn validate_title(title: &str) -> TasksResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TasksError::InvalidArgument {
            reason: "title cannot be empty".to_string(),
        });
    }
    Ok(title.to_string())
}

/// Tasks domain facade combining the ordered store with persistence
pub struct TasksDomain {
    store: Arc<TaskStore>,
    repository: Arc<dyn TaskRepository>,
    changes: Arc<ChangeTracker>,
}

impl TasksDomain {
    /// Create a new tasks domain
    pub fn new(store: Arc<TaskStore>, repository: Arc<dyn TaskRepository>) -> Self {
        let changes = Arc::new(ChangeTracker::new());
        store.subscribe(Arc::clone(&changes) as Arc<dyn TaskListener>);
        Self {
            store,
            repository,
            changes,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    #[must_use]
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    #[must_use]
    pub fn statistics(&self) -> TaskStatistics {
        TaskStatistics::new(Arc::clone(&self.store))
    }

    /// Replace the store contents with the persisted list
    pub async fn load(&self) -> TasksResult<usize> {
        let tasks = self.repository.load().await?;
        let count = tasks.len();
        self.store.replace_all(tasks);
        self.changes.reset();
        info!(
            storage = self.repository.storage_type(),
            count, "Loaded task list"
        );
        Ok(count)
    }

    /// Persist the current store contents
    pub async fn save(&self) -> TasksResult<()> {
        let snapshot = self.store.all();
        self.repository.save(&snapshot).await?;
        self.changes.reset();
        Ok(())
    }

    /// Persist only when the store changed since the last load/save
    pub async fn save_if_changed(&self) -> TasksResult<bool> {
        if !self.changes.is_dirty() {
            return Ok(false);
        }
        self.save().await?;
        Ok(true)
    }

    /// Validate and add a new task
    pub fn add_task(&self, new_task: NewTask) -> TasksResult<Task> {
        let title = validate_title(&new_task.title)?;
        let mut task = Task::new(title, new_task.priority).with_description(new_task.description);
        if let Some(deadline) = new_task.deadline {
            task = task.with_deadline(deadline);
        }
        if let Some(category) = new_task.category {
            task.set_category(category);
        }

        self.store.add(task.clone());
        Ok(task)
    }

    /// Look up a task by id or unique id prefix
    pub fn get_task(&self, reference: &str) -> TasksResult<Task> {
        self.store.find_by_prefix(reference)
    }

    /// Apply an edit and re-sort the task
    pub fn edit_task(&self, reference: &str, mut edit: TaskEdit) -> TasksResult<Task> {
        edit.title = edit.title.as_deref().map(validate_title).transpose()?;

        let task = self.get_task(reference)?;
        self.store
            .update_with(task.id(), |t| edit.apply(t))
            .ok_or_else(|| TasksError::TaskNotFound {
                task_id: reference.to_string(),
            })
    }

    /// Mark a task completed or pending
    pub fn set_completed(&self, reference: &str, completed: bool) -> TasksResult<Task> {
        self.edit_task(
            reference,
            TaskEdit {
                completed: Some(completed),
                ..TaskEdit::default()
            },
        )
    }

    /// Remove a task
    pub fn remove_task(&self, reference: &str) -> TasksResult<Task> {
        let task = self.get_task(reference)?;
        self.store
            .remove_by_id(task.id())
            .ok_or_else(|| TasksError::TaskNotFound {
                task_id: reference.to_string(),
            })
    }
}
