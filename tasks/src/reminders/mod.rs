//! Deadline reminders.
//!
//! - [`ReminderScanner`] polls a store on a fixed cadence
//! - [`classify`] decides which pending tasks are upcoming or overdue
//! - [`ReminderSink`] receives the result; [`TracingSink`], [`ChannelSink`]
//!   and [`FanoutSink`] are provided

mod events;
mod scanner;
mod sink;

pub use events::{ReminderEvent, Severity};
pub use scanner::{
    classify, ReminderScanner, ReminderWindows, ScanReport, ScannerConfig, ScannerState,
    DEFAULT_SCAN_INTERVAL,
};
pub use sink::{deliver, ChannelSink, FanoutSink, ReminderSink, SinkError, TracingSink};
