//! Smart tasks - priority-ordered task tracking with deadline reminders.
//!
//! The [`store::TaskStore`] keeps every task in schedule order (priority,
//! then deadline, then creation time) and notifies subscribed listeners on
//! each mutation. A [`reminders::ReminderScanner`] wakes periodically and
//! reports tasks whose deadline is near or recently passed.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod domain;
pub mod entities;
pub mod errors;
pub mod export;
pub mod reminders;
pub mod storage;
pub mod store;
pub mod ui;

pub use entities::{Task, TaskId, TaskPriority};
pub use errors::{TasksError, TasksResult};
pub use store::TaskStore;
