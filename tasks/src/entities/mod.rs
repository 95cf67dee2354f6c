//! Core data structures for task tracking.

mod config;
mod task;

pub use config::{SchedulerConfig, ENV_DATA_FILE, ENV_SCAN_INTERVAL_SECS};
pub use task::{Task, TaskId, TaskPriority, DEFAULT_CATEGORY};
