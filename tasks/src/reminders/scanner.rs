//! Periodic reminder scanner.
//!
//! Spawns a tokio task that wakes on a fixed interval, snapshots the pending
//! tasks in a [`TaskStore`] and hands qualifying tasks to a
//! [`ReminderSink`]. The store lock is held only while the snapshot is
//! copied; delivery happens afterwards.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::ReminderEvent;
use super::sink::{deliver, ReminderSink};
use crate::entities::{SchedulerConfig, Task};
use crate::errors::{TasksError, TasksResult};
use crate::store::TaskStore;

/// Default interval between scans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Reminder windows, in minutes relative to a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindows {
    /// Upcoming when `0 < minutes_until <= upcoming_minutes`
    pub upcoming_minutes: i64,
    /// Overdue when `-overdue_minutes <= minutes_until < 0`
    pub overdue_minutes: i64,
}

impl Default for ReminderWindows {
    fn default() -> Self {
        Self {
            upcoming_minutes: 30,
            overdue_minutes: 60,
        }
    }
}

/// Scanner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    pub interval: Duration,
    pub windows: ReminderWindows,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCAN_INTERVAL,
            windows: ReminderWindows::default(),
        }
    }
}

impl From<&SchedulerConfig> for ScannerConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            interval: config.scan_interval(),
            windows: ReminderWindows {
                upcoming_minutes: config.upcoming_window_minutes,
                overdue_minutes: config.overdue_window_minutes,
            },
        }
    }
}

/// Lifecycle of a scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Scanning,
    Stopped,
}

impl ScannerState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Scanning => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Scanning,
            _ => Self::Stopped,
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub upcoming: usize,
    pub overdue: usize,
    /// Deliveries the sink rejected
    pub failed: usize,
}

/// Classify tasks into upcoming and overdue reminders at `now`.
///
/// Completed tasks and tasks without a deadline never qualify. Minutes are
/// whole minutes truncated toward zero, so a deadline less than a minute
/// away (or less than a minute past) is in neither window.
#[must_use]
pub fn classify(tasks: &[Task], now: DateTime<Utc>, windows: ReminderWindows) -> Vec<ReminderEvent> {
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| {
            let minutes = task.minutes_until_deadline(now)?;
            if minutes > 0 && minutes <= windows.upcoming_minutes {
                Some(ReminderEvent::Upcoming {
                    task: task.clone(),
                    minutes_remaining: minutes,
                    timestamp: now,
                })
            } else if minutes < 0 && minutes >= -windows.overdue_minutes {
                Some(ReminderEvent::Overdue {
                    task: task.clone(),
                    timestamp: now,
                })
            } else {
                None
            }
        })
        .collect()
}

struct ScanContext {
    store: Arc<TaskStore>,
    sink: Arc<dyn ReminderSink>,
    windows: ReminderWindows,
    state: AtomicU8,
    ticks: AtomicU64,
}

impl ScanContext {
    fn set_state(&self, state: ScannerState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    async fn scan(&self, now: DateTime<Utc>) -> ScanReport {
        let pending = self.store.pending();
        let reminders = classify(&pending, now, self.windows);

        let mut report = ScanReport::default();
        for event in &reminders {
            match event {
                ReminderEvent::Upcoming { .. } => report.upcoming += 1,
                ReminderEvent::Overdue { .. } => report.overdue += 1,
            }

            if let Err(e) = deliver(self.sink.as_ref(), event).await {
                report.failed += 1;
                warn!(
                    sink = self.sink.name(),
                    task_id = %event.task().id(),
                    error = %e,
                    "Failed to deliver reminder"
                );
            }
        }

        debug!(
            pending = pending.len(),
            upcoming = report.upcoming,
            overdue = report.overdue,
            failed = report.failed,
            "Reminder scan complete"
        );
        report
    }
}

/// Background process that periodically emits deadline reminders.
///
/// Ticks start immediately and repeat every `interval`. [`Self::stop`] is
/// final: once it returns, no scan is running and none will start.
pub struct ReminderScanner {
    ctx: Arc<ScanContext>,
    interval: Duration,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderScanner {
    /// Spawn the scan loop on the current tokio runtime.
    ///
    /// Fails without spawning anything when the interval is zero.
    pub fn start(
        store: Arc<TaskStore>,
        sink: Arc<dyn ReminderSink>,
        config: ScannerConfig,
    ) -> TasksResult<Self> {
        if config.interval.is_zero() {
            return Err(TasksError::InvalidConfigValue {
                key: "scanIntervalSecs".to_string(),
                reason: "scan interval must be greater than zero".to_string(),
            });
        }

        let ctx = Arc::new(ScanContext {
            store,
            sink,
            windows: config.windows,
            state: AtomicU8::new(ScannerState::Idle.as_u8()),
            ticks: AtomicU64::new(0),
        });
        let cancel = CancellationToken::new();

        info!(
            interval_secs = config.interval.as_secs(),
            sink = ctx.sink.name(),
            "Reminder scanner started"
        );

        let handle = tokio::spawn(run_loop(
            Arc::clone(&ctx),
            config.interval,
            cancel.clone(),
        ));

        Ok(Self {
            ctx,
            interval: config.interval,
            cancel,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Run one scan immediately, outside the timer.
    ///
    /// Once the scanner has been stopped this delivers nothing and returns an
    /// empty report.
    pub async fn scan_once(&self, now: DateTime<Utc>) -> ScanReport {
        if self.cancel.is_cancelled() {
            debug!("Scan skipped: reminder scanner is stopped");
            return ScanReport::default();
        }
        self.ctx.scan(now).await
    }

    #[must_use]
    pub fn state(&self) -> ScannerState {
        ScannerState::from_u8(self.ctx.state.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state() == ScannerState::Stopped
    }

    /// Number of timer ticks that ran a scan
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ctx.ticks.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the scanner and wait for the loop to exit.
    ///
    /// An in-flight scan is abandoned at its next await point. Safe to call
    /// repeatedly and from any task; later calls wait for the first to finish.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let mut handle = self.handle.lock().await;
        if let Some(join) = handle.take() {
            if let Err(e) = join.await {
                warn!(error = %e, "Reminder scanner task ended abnormally");
            }
            info!(ticks = self.tick_count(), "Reminder scanner stopped");
        }
        self.ctx.set_state(ScannerState::Stopped);
    }
}

impl Drop for ReminderScanner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_loop(ctx: Arc<ScanContext>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        ctx.set_state(ScannerState::Scanning);
        ctx.ticks.fetch_add(1, Ordering::SeqCst);

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ctx.scan(Utc::now()) => {}
        }

        ctx.set_state(ScannerState::Idle);
    }

    ctx.set_state(ScannerState::Stopped);
    debug!("Reminder scan loop exited");
}
