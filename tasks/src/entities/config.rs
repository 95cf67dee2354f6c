//! Scheduler configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{TasksError, TasksResult};

/// Environment variable overriding the task data file
pub const ENV_DATA_FILE: &str = "SMART_TASKS_DATA_FILE";

/// Environment variable overriding the reminder scan interval
pub const ENV_SCAN_INTERVAL_SECS: &str = "SMART_TASKS_SCAN_INTERVAL_SECS";

/// Project-level settings stored in `.tasks/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Task list location, relative to the project root unless absolute
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Seconds between reminder scans
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Tasks due within this many minutes trigger an upcoming reminder
    #[serde(default = "default_upcoming_window")]
    pub upcoming_window_minutes: i64,

    /// Tasks overdue by at most this many minutes trigger an overdue notice
    #[serde(default = "default_overdue_window")]
    pub overdue_window_minutes: i64,

    /// Horizon used by the "due soon" statistic
    #[serde(default = "default_due_soon_hours")]
    pub due_soon_hours: i64,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("tasks.json")
}

fn default_scan_interval_secs() -> u64 {
    5 * 60
}

fn default_upcoming_window() -> i64 {
    30
}

fn default_overdue_window() -> i64 {
    60
}

fn default_due_soon_hours() -> i64 {
    24
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            scan_interval_secs: default_scan_interval_secs(),
            upcoming_window_minutes: default_upcoming_window(),
            overdue_window_minutes: default_overdue_window(),
            due_soon_hours: default_due_soon_hours(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Apply `SMART_TASKS_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> TasksResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> TasksResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_FILE).filter(|v| !v.trim().is_empty()) {
            self.data_file = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_SCAN_INTERVAL_SECS) {
            self.scan_interval_secs =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| TasksError::InvalidConfigValue {
                        key: ENV_SCAN_INTERVAL_SECS.to_string(),
                        reason: e.to_string(),
                    })?;
        }

        self.validate()
    }

    /// Reject settings the scanner cannot run with
    pub fn validate(&self) -> TasksResult<()> {
        if self.scan_interval_secs == 0 {
            return Err(TasksError::ConfigError {
                reason: "scanIntervalSecs must be greater than zero".to_string(),
            });
        }
        if self.upcoming_window_minutes <= 0 || self.overdue_window_minutes <= 0 {
            return Err(TasksError::ConfigError {
                reason: "reminder windows must be positive".to_string(),
            });
        }
        if self.due_soon_hours <= 0 {
            return Err(TasksError::InvalidConfigValue {
                key: "dueSoonHours".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
