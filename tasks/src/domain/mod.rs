//! Domain facades for task tracking.
//!
//! These facades provide high-level operations that combine
//! the ordered store with persistence and configuration.

mod config;
mod stats;
mod tasks;

pub use config::ConfigDomain;
pub use stats::{StatsSummary, TaskStatistics};
pub use tasks::{parse_deadline, NewTask, TaskEdit, TasksDomain};
