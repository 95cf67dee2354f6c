//! Task entity and related types.

use std::cmp::Ordering;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::TasksError;

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "General";

/// Opaque task identity.
///
/// Assigned once at construction and never derived from task fields, so two
/// tasks with identical attributes are still distinct entities. Clones share
/// the id and refer to the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh identity
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in tables and CLI output
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// Whether the textual id starts with the given prefix (hyphens ignored)
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let needle: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_lowercase();
        !needle.is_empty() && self.0.simple().to_string().starts_with(&needle)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority levels, ordered from least to most important
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// All priorities, lowest first
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" | "critical" | "crit" => Ok(Self::Urgent),
            _ => Err(TasksError::InvalidPriority {
                priority: s.to_string(),
            }),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => default_category(),
    }
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_category(raw.as_deref()))
}

/// A tracked task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Entity identity; regenerated when absent from stored data
    #[serde(default)]
    id: TaskId,

    /// Brief, descriptive title (non-empty, checked at the input boundary)
    pub title: String,

    /// Free-form notes
    #[serde(default)]
    pub description: String,

    /// Task priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional due instant
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    /// Stamped once at construction
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,

    #[serde(default)]
    pub completed: bool,

    #[serde(
        default = "default_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: String,
}

impl Task {
    /// Create a pending task in the default category
    pub fn new(title: impl Into<String>, priority: TaskPriority) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            priority,
            deadline: None,
            created_at: Utc::now(),
            completed: false,
            category: default_category(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        self.set_category(category);
        self
    }

    /// Override the creation stamp (used when rebuilding tasks from storage)
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set the category; blank input falls back to "General"
    pub fn set_category(&mut self, category: impl AsRef<str>) {
        self.category = normalize_category(Some(category.as_ref()));
    }

    /// Deadline falls on today's local calendar date
    #[must_use]
    pub fn is_due_today(&self) -> bool {
        self.is_due_today_at(Utc::now())
    }

    #[must_use]
    pub fn is_due_today_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| {
            deadline.with_timezone(&Local).date_naive() == now.with_timezone(&Local).date_naive()
        })
    }

    /// Deadline has passed. Completion is not considered here.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Whole minutes from `now` until the deadline, truncated toward zero.
    /// Negative once the deadline has passed.
    #[must_use]
    pub fn minutes_until_deadline(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline.map(|deadline| (deadline - now).num_minutes())
    }

    /// Deadline rendered for humans in local time
    #[must_use]
    pub fn formatted_deadline(&self) -> String {
        match self.deadline {
            Some(deadline) => deadline
                .with_timezone(&Local)
                .format("%b %d, %Y %H:%M")
                .to_string(),
            None => "No deadline".to_string(),
        }
    }

    /// Scheduling order: higher priority first, then tasks with a deadline
    /// before those without, earlier deadline first, earlier creation first.
    /// Identity breaks any remaining tie, so distinct tasks never compare equal.
    #[must_use]
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| match (self.deadline, other.deadline) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.priority,
            self.title,
            self.formatted_deadline()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn local_noon() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_task_new() {
        let task = Task::new("Write report", TaskPriority::High);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(task.description.is_empty());
        assert!(task.deadline.is_none());
        assert!(!task.completed);
    }

    #[test]
    fn test_identical_fields_are_distinct_entities() {
        let a = Task::new("Same", TaskPriority::Low);
        let b = Task::new("Same", TaskPriority::Low);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_priority_parsing_and_order() {
        assert_eq!("low".parse::<TaskPriority>().unwrap(), TaskPriority::Low);
        assert_eq!("MED".parse::<TaskPriority>().unwrap(), TaskPriority::Medium);
        assert_eq!(
            "critical".parse::<TaskPriority>().unwrap(),
            TaskPriority::Urgent
        );
        assert!("someday".parse::<TaskPriority>().is_err());

        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::High < TaskPriority::Urgent);
    }

    #[test]
    fn test_blank_category_defaults() {
        let task = Task::new("x", TaskPriority::Low).with_category("   ");
        assert_eq!(task.category, "General");

        let task = Task::new("x", TaskPriority::Low).with_category("Work");
        assert_eq!(task.category, "Work");
    }

    #[test]
    fn test_overdue_ignores_completion() {
        let now = local_noon();
        let mut task =
            Task::new("late", TaskPriority::Low).with_deadline(now - Duration::minutes(1));
        task.completed = true;
        assert!(task.is_overdue_at(now));

        let future = Task::new("soon", TaskPriority::Low).with_deadline(now + Duration::hours(1));
        assert!(!future.is_overdue_at(now));
        assert!(!Task::new("none", TaskPriority::Low).is_overdue_at(now));
    }

    #[test]
    fn test_due_today_uses_calendar_date() {
        let now = local_noon();
        let later_today =
            Task::new("a", TaskPriority::Low).with_deadline(now + Duration::hours(3));
        let tomorrow = Task::new("b", TaskPriority::Low).with_deadline(now + Duration::days(1));
        let earlier_today =
            Task::new("c", TaskPriority::Low).with_deadline(now - Duration::hours(2));

        assert!(later_today.is_due_today_at(now));
        assert!(earlier_today.is_due_today_at(now));
        assert!(!tomorrow.is_due_today_at(now));
    }

    #[test]
    fn test_minutes_until_truncates() {
        let now = local_noon();
        let task = Task::new("x", TaskPriority::Low)
            .with_deadline(now + Duration::minutes(10) + Duration::seconds(59));
        assert_eq!(task.minutes_until_deadline(now), Some(10));

        let task = Task::new("x", TaskPriority::Low)
            .with_deadline(now - Duration::minutes(45) - Duration::seconds(30));
        assert_eq!(task.minutes_until_deadline(now), Some(-45));
    }

    #[test]
    fn test_schedule_cmp_rules() {
        let now = local_noon();
        let high = Task::new("high", TaskPriority::High);
        let low = Task::new("low", TaskPriority::Low).with_deadline(now);
        assert_eq!(high.schedule_cmp(&low), Ordering::Less);

        let dated = Task::new("dated", TaskPriority::Medium).with_deadline(now);
        let undated = Task::new("undated", TaskPriority::Medium);
        assert_eq!(dated.schedule_cmp(&undated), Ordering::Less);
        assert_eq!(undated.schedule_cmp(&dated), Ordering::Greater);

        let earlier = Task::new("e", TaskPriority::Medium).with_deadline(now);
        let later = Task::new("l", TaskPriority::Medium).with_deadline(now + Duration::hours(1));
        assert_eq!(earlier.schedule_cmp(&later), Ordering::Less);
    }

    #[test]
    fn test_equal_deadlines_fall_back_to_creation() {
        let now = local_noon();
        let first = Task::new("first", TaskPriority::High)
            .with_deadline(now)
            .with_created_at(now - Duration::hours(2));
        let second = Task::new("second", TaskPriority::High)
            .with_deadline(now)
            .with_created_at(now - Duration::hours(1));
        assert_eq!(first.schedule_cmp(&second), Ordering::Less);
        assert_eq!(second.schedule_cmp(&first), Ordering::Greater);
    }

    #[test]
    fn test_distinct_tasks_never_compare_equal() {
        let now = local_noon();
        let a = Task::new("twin", TaskPriority::Low).with_created_at(now);
        let b = Task::new("twin", TaskPriority::Low).with_created_at(now);
        assert_ne!(a.schedule_cmp(&b), Ordering::Equal);
        assert_eq!(a.schedule_cmp(&b), b.schedule_cmp(&a).reverse());
        assert_eq!(a.schedule_cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_id_prefix_matching() {
        let task = Task::new("x", TaskPriority::Low);
        let short = task.id().short();
        assert!(task.id().matches_prefix(&short));
        assert!(task.id().matches_prefix(&short.to_uppercase()));
        assert!(!task.id().matches_prefix(""));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"title":"Imported","priority":"urgent","createdAt":"2026-01-05T09:30:00Z","category":""}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, TaskPriority::Urgent);
        assert_eq!(task.category, "General");
        assert!(!task.completed);
        assert!(task.deadline.is_none());
    }

    #[test]
    fn test_display() {
        let task = Task::new("Pay rent", TaskPriority::Urgent);
        assert_eq!(task.to_string(), "[urgent] Pay rent - No deadline");
    }
}
