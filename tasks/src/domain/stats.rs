//! Derived task statistics.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::entities::{Task, TaskPriority};
use crate::store::TaskStore;

/// Point-in-time aggregate view over a store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Percentage in `0.0..=100.0`
    pub completion_rate: f64,
    pub by_priority: BTreeMap<TaskPriority, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub due_soon: usize,
    pub due_soon_hours: i64,
    pub average_planned_hours: f64,
}

/// Read-only statistics computed on demand from a [`TaskStore`] snapshot.
#[derive(Debug, Clone)]
pub struct TaskStatistics {
    store: Arc<TaskStore>,
}

impl TaskStatistics {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.store.completed().len()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.store.pending().len()
    }

    #[must_use]
    pub fn overdue(&self) -> usize {
        self.store.overdue().len()
    }

    #[must_use]
    pub fn overdue_at(&self, now: DateTime<Utc>) -> usize {
        self.store.overdue_at(now).len()
    }

    /// Completed share of all tasks, as a percentage. 0.0 for an empty store.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        completion_rate(&self.store.all())
    }

    /// Task counts per priority; absent priorities are omitted
    #[must_use]
    pub fn by_priority(&self) -> BTreeMap<TaskPriority, usize> {
        count_by(&self.store.all(), |t| t.priority)
    }

    /// Task counts per category; absent categories are omitted
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<String, usize> {
        count_by(&self.store.all(), |t| t.category.clone())
    }

    /// Pending tasks due strictly between now and now + `hours`
    #[must_use]
    pub fn due_within_hours(&self, hours: i64) -> usize {
        self.due_within_hours_at(hours, Utc::now())
    }

    #[must_use]
    pub fn due_within_hours_at(&self, hours: i64, now: DateTime<Utc>) -> usize {
        due_within(&self.store.pending(), now, hours)
    }

    /// Mean whole-hour span from creation to deadline over completed tasks
    /// that have a deadline. 0.0 when there are none.
    #[must_use]
    pub fn average_planned_hours(&self) -> f64 {
        average_planned_hours(&self.store.completed())
    }

    /// Every aggregate, computed from a single snapshot
    #[must_use]
    pub fn summary(&self, due_soon_hours: i64) -> StatsSummary {
        self.summary_at(Utc::now(), due_soon_hours)
    }

    #[must_use]
    pub fn summary_at(&self, now: DateTime<Utc>, due_soon_hours: i64) -> StatsSummary {
        let tasks = self.store.all();
        let completed: Vec<Task> = tasks.iter().filter(|t| t.completed).cloned().collect();
        let pending: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();

        StatsSummary {
            total: tasks.len(),
            completed: completed.len(),
            pending: pending.len(),
            overdue: pending.iter().filter(|t| t.is_overdue_at(now)).count(),
            completion_rate: completion_rate(&tasks),
            by_priority: count_by(&tasks, |t| t.priority),
            by_category: count_by(&tasks, |t| t.category.clone()),
            due_soon: due_within(&pending, now, due_soon_hours),
            due_soon_hours,
            average_planned_hours: average_planned_hours(&completed),
        }
    }
}

fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = done as f64 / tasks.len() as f64 * 100.0;
    rate
}

fn count_by<K, F>(tasks: &[Task], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&Task) -> K,
{
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(key(task)).or_insert(0) += 1;
    }
    counts
}

fn due_within(pending: &[Task], now: DateTime<Utc>, hours: i64) -> usize {
    let horizon = now + Duration::hours(hours);
    pending
        .iter()
        .filter_map(|t| t.deadline)
        .filter(|deadline| *deadline > now && *deadline < horizon)
        .count()
}

fn average_planned_hours(completed: &[Task]) -> f64 {
    let spans: Vec<i64> = completed
        .iter()
        .filter_map(|t| t.deadline.map(|d| (d - t.created_at()).num_hours()))
        .collect();

    if spans.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let average = spans.iter().sum::<i64>() as f64 / spans.len() as f64;
    average
}
