//! Reminder event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Task;

/// How loudly a reminder should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A deadline is approaching
    Warning,
    /// A deadline has passed
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// A task that qualified for a reminder during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReminderEvent {
    /// Deadline falls inside the upcoming window
    Upcoming {
        task: Task,
        minutes_remaining: i64,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// Deadline passed within the overdue window
    Overdue {
        task: Task,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl ReminderEvent {
    #[must_use]
    pub fn task(&self) -> &Task {
        match self {
            Self::Upcoming { task, .. } | Self::Overdue { task, .. } => task,
        }
    }

    /// Short heading for this event.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Upcoming { .. } => "Task Reminder",
            Self::Overdue { .. } => "Overdue Task",
        }
    }

    /// Human-readable reminder text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Upcoming {
                task,
                minutes_remaining,
                ..
            } => format!(
                "Task '{}' is due in {} minutes! Priority: {}",
                task.title, minutes_remaining, task.priority
            ),
            Self::Overdue { task, .. } => format!(
                "Task '{}' is overdue! Deadline was: {}",
                task.title,
                task.formatted_deadline()
            ),
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Upcoming { .. } => Severity::Warning,
            Self::Overdue { .. } => Severity::Critical,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Upcoming { timestamp, .. } | Self::Overdue { timestamp, .. } => *timestamp,
        }
    }
}
