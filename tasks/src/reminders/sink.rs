//! Reminder sinks.
//!
//! The scanner decides *which* tasks need attention; a [`ReminderSink`]
//! decides how the user hears about it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::events::ReminderEvent;
use crate::entities::Task;

/// Errors a sink can report while delivering a reminder.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side has gone away
    #[error("Reminder channel closed")]
    Closed,

    /// Delivery failed for a sink-specific reason
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Destination for reminders produced by the scanner.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Get the name of this sink.
    fn name(&self) -> &'static str;

    /// A pending task is due within the upcoming window.
    async fn notify_upcoming(&self, task: &Task, minutes_remaining: i64) -> Result<(), SinkError>;

    /// A pending task's deadline passed within the overdue window.
    async fn notify_overdue(&self, task: &Task) -> Result<(), SinkError>;
}

/// Route an event to the matching sink method.
pub async fn deliver(sink: &dyn ReminderSink, event: &ReminderEvent) -> Result<(), SinkError> {
    match event {
        ReminderEvent::Upcoming {
            task,
            minutes_remaining,
            ..
        } => sink.notify_upcoming(task, *minutes_remaining).await,
        ReminderEvent::Overdue { task, .. } => sink.notify_overdue(task).await,
    }
}

/// Writes reminders to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl ReminderSink for TracingSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn notify_upcoming(&self, task: &Task, minutes_remaining: i64) -> Result<(), SinkError> {
        info!(
            task_id = %task.id(),
            title = %task.title,
            priority = %task.priority,
            minutes_remaining,
            "Task due soon"
        );
        Ok(())
    }

    async fn notify_overdue(&self, task: &Task) -> Result<(), SinkError> {
        warn!(
            task_id = %task.id(),
            title = %task.title,
            deadline = %task.formatted_deadline(),
            "Task overdue"
        );
        Ok(())
    }
}

/// Forwards reminders as [`ReminderEvent`]s over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ReminderEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that will observe its events.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReminderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ReminderEvent) -> Result<(), SinkError> {
        self.tx.send(event).map_err(|_| SinkError::Closed)
    }
}

#[async_trait]
impl ReminderSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn notify_upcoming(&self, task: &Task, minutes_remaining: i64) -> Result<(), SinkError> {
        self.send(ReminderEvent::Upcoming {
            task: task.clone(),
            minutes_remaining,
            timestamp: Utc::now(),
        })
    }

    async fn notify_overdue(&self, task: &Task) -> Result<(), SinkError> {
        self.send(ReminderEvent::Overdue {
            task: task.clone(),
            timestamp: Utc::now(),
        })
    }
}

/// Dispatches every reminder to several sinks concurrently.
///
/// A failing sink does not prevent delivery to the others; failures are
/// logged and summarized in the returned error.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ReminderSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn ReminderSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReminderSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    async fn dispatch(&self, event: &ReminderEvent) -> Result<(), SinkError> {
        let results = join_all(self.sinks.iter().map(|sink| async move {
            let result = deliver(sink.as_ref(), event).await;
            (sink.name(), result)
        }))
        .await;

        let mut failed = 0;
        for (name, result) in results {
            match result {
                Ok(()) => debug!(sink = name, "Reminder delivered"),
                Err(e) => {
                    failed += 1;
                    warn!(sink = name, error = %e, "Failed to deliver reminder");
                }
            }
        }

        if failed == 0 {
            Ok(())
        } else {
            Err(SinkError::Delivery(format!(
                "{failed} of {} sinks failed",
                self.sinks.len()
            )))
        }
    }
}

#[async_trait]
impl ReminderSink for FanoutSink {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn notify_upcoming(&self, task: &Task, minutes_remaining: i64) -> Result<(), SinkError> {
        self.dispatch(&ReminderEvent::Upcoming {
            task: task.clone(),
            minutes_remaining,
            timestamp: Utc::now(),
        })
        .await
    }

    async fn notify_overdue(&self, task: &Task) -> Result<(), SinkError> {
        self.dispatch(&ReminderEvent::Overdue {
            task: task.clone(),
            timestamp: Utc::now(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TaskPriority;

    struct BrokenSink;

    #[async_trait]
    impl ReminderSink for BrokenSink {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn notify_upcoming(&self, _task: &Task, _minutes: i64) -> Result<(), SinkError> {
            Err(SinkError::Delivery("offline".to_string()))
        }

        async fn notify_overdue(&self, _task: &Task) -> Result<(), SinkError> {
            Err(SinkError::Delivery("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::channel();
        let task = Task::new("Stretch", TaskPriority::Low);

        sink.notify_upcoming(&task, 7).await.unwrap();
        sink.notify_overdue(&task).await.unwrap();

        match rx.recv().await.unwrap() {
            ReminderEvent::Upcoming {
                task: got,
                minutes_remaining,
                ..
            } => {
                assert_eq!(got.id(), task.id());
                assert_eq!(minutes_remaining, 7);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            ReminderEvent::Overdue { .. }
        ));
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        let task = Task::new("Nobody listens", TaskPriority::Low);
        let result = tokio_test::block_on(sink.notify_overdue(&task));
        assert!(matches!(result, Err(SinkError::Closed)));
    }

    #[tokio::test]
    async fn test_fanout_delivers_despite_failures() {
        let (channel, mut rx) = ChannelSink::channel();
        let fanout = FanoutSink::default()
            .with_sink(Arc::new(BrokenSink))
            .with_sink(Arc::new(channel))
            .with_sink(Arc::new(TracingSink));

        let task = Task::new("Water plants", TaskPriority::Medium);
        let result = fanout.notify_upcoming(&task, 20).await;

        assert!(matches!(result, Err(SinkError::Delivery(ref m)) if m == "1 of 3 sinks failed"));
        assert!(matches!(
            rx.recv().await.unwrap(),
            ReminderEvent::Upcoming {
                minutes_remaining: 20,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_deliver_routes_by_kind() {
        let (sink, mut rx) = ChannelSink::channel();
        let event = ReminderEvent::Overdue {
            task: Task::new("x", TaskPriority::Low),
            timestamp: Utc::now(),
        };
        deliver(&sink, &event).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ReminderEvent::Overdue { .. })));
    }
}
