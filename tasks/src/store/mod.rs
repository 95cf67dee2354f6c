//! Priority-ordered, thread-safe task container.
//!
//! [`TaskStore`] keeps its tasks in a vector sorted by
//! [`Task::schedule_cmp`]. Every mutation re-establishes that order under a
//! single exclusive lock; queries take the shared lock and return owned
//! snapshots, so later mutations never show through a list already handed
//! out.

mod listener;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entities::{Task, TaskId, TaskPriority};
use crate::errors::{TasksError, TasksResult};

pub use listener::{ChangeTracker, ListenerId, TaskListener};

/// Concurrency-safe task container maintaining scheduling order
#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<Vec<Task>>,
    listeners: RwLock<HashMap<ListenerId, Arc<dyn TaskListener>>>,
    next_listener: AtomicU64,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.len())
            .field("listeners", &self.read_listeners().len())
            .finish()
    }
}

impl TaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously loaded tasks without firing events
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        store.replace_all(tasks);
        store
    }

    // === Observers ===

    /// Register a listener for added/removed/updated events
    pub fn subscribe(&self, listener: Arc<dyn TaskListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.write_listeners().insert(id, listener);
        id
    }

    /// Drop a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.write_listeners().remove(&id).is_some()
    }

    // === Mutations ===

    /// Insert a task at its ordered position.
    ///
    /// Adding a task whose identity is already present is not detected.
    pub fn add(&self, task: Task) {
        let event = task.clone();
        {
            let mut tasks = self.write_tasks();
            insert_ordered(&mut tasks, task);
        }
        debug!(task_id = %event.id(), title = %event.title, "Task added");
        self.emit(|l| l.on_task_added(&event));
    }

    /// Remove a task by identity. Returns `false` if it was not present.
    pub fn remove(&self, task: &Task) -> bool {
        self.remove_by_id(task.id()).is_some()
    }

    /// Remove by identity, returning the stored task if it was present
    pub fn remove_by_id(&self, id: TaskId) -> Option<Task> {
        let removed = {
            let mut tasks = self.write_tasks();
            tasks
                .iter()
                .position(|t| t.id() == id)
                .map(|idx| tasks.remove(idx))
        };

        if let Some(ref task) = removed {
            debug!(task_id = %id, "Task removed");
            self.emit(|l| l.on_task_removed(task));
        }
        removed
    }

    /// Store the caller's modified copy and move it to its new position.
    ///
    /// The old entry is taken out and the task re-inserted, so a changed
    /// priority or deadline takes effect on the next read. A task that was not
    /// present is inserted. The updated event fires in either case.
    ///
    /// The stored copy is replaced wholesale, so a change another caller made
    /// since `task` was read is lost. Use [`Self::update_with`] when several
    /// editors may touch the same task.
    pub fn update(&self, task: Task) {
        let event = task.clone();
        {
            let mut tasks = self.write_tasks();
            if let Some(idx) = tasks.iter().position(|t| t.id() == task.id()) {
                tasks.remove(idx);
            }
            insert_ordered(&mut tasks, task);
        }
        debug!(task_id = %event.id(), "Task updated");
        self.emit(|l| l.on_task_updated(&event));
    }

    /// Mutate a stored task in place and re-sort it, under one lock.
    ///
    /// Returns the updated task, or `None` when the id is unknown (no event).
    pub fn update_with<F>(&self, id: TaskId, mutate: F) -> Option<Task>
    where
        F: FnOnce(&mut Task),
    {
        let updated = {
            let mut tasks = self.write_tasks();
            let idx = tasks.iter().position(|t| t.id() == id)?;
            let mut task = tasks.remove(idx);
            mutate(&mut task);
            insert_ordered(&mut tasks, task.clone());
            task
        };
        debug!(task_id = %id, "Task updated");
        self.emit(|l| l.on_task_updated(&updated));
        Some(updated)
    }

    /// Remove every task. No per-task events fire.
    pub fn clear(&self) {
        self.write_tasks().clear();
        debug!("Task store cleared");
    }

    /// Swap the whole membership for a loaded list. No per-task events fire.
    pub fn replace_all(&self, mut tasks: Vec<Task>) {
        tasks.sort_by(Task::schedule_cmp);
        let count = tasks.len();
        *self.write_tasks() = tasks;
        debug!(count, "Task store replaced");
    }

    // === Queries ===

    /// Every task in scheduling order
    #[must_use]
    pub fn all(&self) -> Vec<Task> {
        self.read_tasks().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_tasks().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_tasks().is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.read_tasks().iter().find(|t| t.id() == id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.read_tasks().iter().any(|t| t.id() == id)
    }

    /// Resolve a (possibly abbreviated) id typed by a user
    pub fn find_by_prefix(&self, prefix: &str) -> TasksResult<Task> {
        let mut matches = self.filtered(|t| t.id().matches_prefix(prefix));
        match matches.len() {
            0 => Err(TasksError::TaskNotFound {
                task_id: prefix.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            n => Err(TasksError::AmbiguousTask {
                prefix: prefix.to_string(),
                matches: n,
            }),
        }
    }

    #[must_use]
    pub fn by_priority(&self, priority: TaskPriority) -> Vec<Task> {
        self.filtered(|t| t.priority == priority)
    }

    /// Tasks whose category matches, ignoring case
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Task> {
        let wanted = category.to_lowercase();
        self.filtered(|t| t.category.to_lowercase() == wanted)
    }

    #[must_use]
    pub fn pending(&self) -> Vec<Task> {
        self.filtered(|t| !t.completed)
    }

    #[must_use]
    pub fn completed(&self) -> Vec<Task> {
        self.filtered(|t| t.completed)
    }

    #[must_use]
    pub fn due_today(&self) -> Vec<Task> {
        self.due_today_at(Utc::now())
    }

    #[must_use]
    pub fn due_today_at(&self, now: DateTime<Utc>) -> Vec<Task> {
        self.filtered(|t| t.is_due_today_at(now))
    }

    /// Pending tasks whose deadline has passed
    #[must_use]
    pub fn overdue(&self) -> Vec<Task> {
        self.overdue_at(Utc::now())
    }

    #[must_use]
    pub fn overdue_at(&self, now: DateTime<Utc>) -> Vec<Task> {
        self.filtered(|t| !t.completed && t.is_overdue_at(now))
    }

    /// Distinct categories currently present
    #[must_use]
    pub fn categories(&self) -> BTreeSet<String> {
        self.read_tasks()
            .iter()
            .map(|t| t.category.clone())
            .collect()
    }

    // === Internals ===

    fn filtered<P>(&self, predicate: P) -> Vec<Task>
    where
        P: Fn(&Task) -> bool,
    {
        self.read_tasks()
            .iter()
            .filter(|t| predicate(t))
            .cloned()
            .collect()
    }

    fn emit<F>(&self, notify: F)
    where
        F: Fn(&dyn TaskListener),
    {
        let listeners: Vec<Arc<dyn TaskListener>> =
            self.read_listeners().values().cloned().collect();
        for listener in &listeners {
            notify(listener.as_ref());
        }
    }

    fn read_tasks(&self) -> RwLockReadGuard<'_, Vec<Task>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tasks(&self) -> RwLockWriteGuard<'_, Vec<Task>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_listeners(&self) -> RwLockReadGuard<'_, HashMap<ListenerId, Arc<dyn TaskListener>>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_listeners(
        &self,
    ) -> RwLockWriteGuard<'_, HashMap<ListenerId, Arc<dyn TaskListener>>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert_ordered(tasks: &mut Vec<Task>, task: Task) {
    let idx = tasks.partition_point(|existing| existing.schedule_cmp(&task).is_lt());
    tasks.insert(idx, task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(&'static str, String)>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<(&'static str, String)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl TaskListener for Recorder {
        fn on_task_added(&self, task: &Task) {
            self.events.lock().unwrap().push(("added", task.title.clone()));
        }

        fn on_task_removed(&self, task: &Task) {
            self.events
                .lock()
                .unwrap()
                .push(("removed", task.title.clone()));
        }

        fn on_task_updated(&self, task: &Task) {
            self.events
                .lock()
                .unwrap()
                .push(("updated", task.title.clone()));
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_distinct_priorities_sorted_descending() {
        let store = TaskStore::new();
        store.add(Task::new("low", TaskPriority::Low));
        store.add(Task::new("urgent", TaskPriority::Urgent));
        store.add(Task::new("medium", TaskPriority::Medium));
        store.add(Task::new("high", TaskPriority::High));

        assert_eq!(
            titles(&store.all()),
            vec!["urgent", "high", "medium", "low"]
        );
    }

    #[test]
    fn test_deadline_precedes_no_deadline_regardless_of_insertion() {
        let now = Utc::now();
        for dated_first in [true, false] {
            let store = TaskStore::new();
            let dated =
                Task::new("dated", TaskPriority::Medium).with_deadline(now + Duration::days(3));
            let undated = Task::new("undated", TaskPriority::Medium);
            if dated_first {
                store.add(dated);
                store.add(undated);
            } else {
                store.add(undated);
                store.add(dated);
            }
            assert_eq!(titles(&store.all()), vec!["dated", "undated"]);
        }
    }

    #[test]
    fn test_update_moves_raised_priority_forward() {
        let store = TaskStore::new();
        let chore = Task::new("chore", TaskPriority::Low);
        store.add(Task::new("important", TaskPriority::High));
        store.add(chore.clone());

        let mut raised = chore;
        raised.priority = TaskPriority::Urgent;
        store.update(raised);

        assert_eq!(titles(&store.all()), vec!["chore", "important"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_with_mutates_and_resorts() {
        let store = TaskStore::new();
        let target = Task::new("target", TaskPriority::Low);
        let id = target.id();
        store.add(Task::new("other", TaskPriority::Medium));
        store.add(target);

        let updated = store
            .update_with(id, |t| t.priority = TaskPriority::High)
            .unwrap();
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(titles(&store.all()), vec!["target", "other"]);

        assert!(store.update_with(TaskId::new(), |_| {}).is_none());
    }

    #[test]
    fn test_update_with_keeps_changes_made_since_read() {
        let store = TaskStore::new();
        let task = Task::new("report", TaskPriority::Low);
        let id = task.id();
        store.add(task);

        let stale = store.get(id).unwrap();
        store.update_with(id, |t| t.completed = true);

        // Editing through update_with sees the completion made above
        store.update_with(id, |t| t.priority = TaskPriority::High);
        let current = store.get(id).unwrap();
        assert!(current.completed);
        assert_eq!(current.priority, TaskPriority::High);

        // A stale copy handed to update replaces the stored one
        store.update(stale);
        assert!(!store.get(id).unwrap().completed);
    }

    #[test]
    fn test_remove_reports_presence_and_fires_once() {
        let store = TaskStore::new();
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone());

        let task = Task::new("doomed", TaskPriority::Medium);
        let stranger = Task::new("stranger", TaskPriority::Medium);
        store.add(task.clone());

        assert!(!store.remove(&stranger));
        assert!(store.remove(&task));
        assert!(!store.remove(&task));

        assert!(store.all().is_empty());
        assert!(store.pending().is_empty());
        assert_eq!(
            recorder.events(),
            vec![
                ("added", "doomed".to_string()),
                ("removed", "doomed".to_string())
            ]
        );
    }

    #[test]
    fn test_update_fires_even_for_absent_task() {
        let store = TaskStore::new();
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone());

        store.update(Task::new("late arrival", TaskPriority::Low));
        assert_eq!(
            recorder.events(),
            vec![("updated", "late arrival".to_string())]
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let store = TaskStore::new();
        let recorder = Arc::new(Recorder::default());
        let id = store.subscribe(recorder.clone());

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add(Task::new("quiet", TaskPriority::Low));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_clear_fires_no_events() {
        let store = TaskStore::new();
        store.add(Task::new("a", TaskPriority::Low));
        store.add(Task::new("b", TaskPriority::Low));

        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone());
        store.clear();

        assert!(store.is_empty());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let store = TaskStore::new();
        let task = Task::new("kept", TaskPriority::Medium);
        store.add(task.clone());

        let snapshot = store.all();
        store.remove(&task);
        store.add(Task::new("new", TaskPriority::Urgent));

        assert_eq!(titles(&snapshot), vec!["kept"]);
    }

    #[test]
    fn test_filtered_queries_preserve_order() {
        let now = Utc::now();
        let store = TaskStore::new();
        let mut done = Task::new("done", TaskPriority::Urgent)
            .with_category("Work")
            .with_deadline(now - Duration::hours(1));
        done.completed = true;
        store.add(done);
        store.add(Task::new("work-high", TaskPriority::High).with_category("work"));
        store.add(
            Task::new("late", TaskPriority::Low)
                .with_category("Home")
                .with_deadline(now - Duration::hours(2)),
        );
        store.add(Task::new("work-low", TaskPriority::Low).with_category("WORK"));

        assert_eq!(
            titles(&store.by_category("Work")),
            vec!["done", "work-high", "work-low"]
        );
        assert_eq!(
            titles(&store.pending()),
            vec!["work-high", "late", "work-low"]
        );
        assert_eq!(titles(&store.completed()), vec!["done"]);
        assert_eq!(titles(&store.overdue_at(now)), vec!["late"]);
        assert_eq!(
            titles(&store.by_priority(TaskPriority::Low)),
            vec!["late", "work-low"]
        );
    }

    #[test]
    fn test_categories_are_distinct() {
        let store = TaskStore::new();
        store.add(Task::new("a", TaskPriority::Low).with_category("Work"));
        store.add(Task::new("b", TaskPriority::Low).with_category("Work"));
        store.add(Task::new("c", TaskPriority::Low));

        let categories: Vec<String> = store.categories().into_iter().collect();
        assert_eq!(categories, vec!["General".to_string(), "Work".to_string()]);
    }

    #[test]
    fn test_find_by_prefix() {
        let store = TaskStore::new();
        let task = Task::new("findme", TaskPriority::Low);
        store.add(task.clone());

        let found = store.find_by_prefix(&task.id().short()).unwrap();
        assert_eq!(found.id(), task.id());
        assert!(matches!(
            store.find_by_prefix("zzzz"),
            Err(TasksError::TaskNotFound { .. })
        ));
    }

    #[test]
    fn test_listener_may_read_store() {
        struct Peeker {
            store: std::sync::Weak<TaskStore>,
            seen: Mutex<Vec<usize>>,
        }

        impl TaskListener for Peeker {
            fn on_task_added(&self, _task: &Task) {
                if let Some(store) = self.store.upgrade() {
                    self.seen.lock().unwrap().push(store.len());
                }
            }
        }

        let store = Arc::new(TaskStore::new());
        let peeker = Arc::new(Peeker {
            store: Arc::downgrade(&store),
            seen: Mutex::new(Vec::new()),
        });
        store.subscribe(peeker.clone());

        store.add(Task::new("one", TaskPriority::Low));
        store.add(Task::new("two", TaskPriority::Low));
        assert_eq!(*peeker.seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_concurrent_mutation_keeps_order() {
        let store = Arc::new(TaskStore::new());

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..50 {
                        let priority = TaskPriority::ALL[(worker + i) % 4];
                        let task = Task::new(format!("w{worker}-{i}"), priority);
                        store.add(task.clone());
                        if i % 5 == 0 {
                            store.remove(&task);
                        }
                    }
                });
            }
            let reader = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..50 {
                    let snapshot = reader.all();
                    assert!(snapshot
                        .windows(2)
                        .all(|pair| pair[0].schedule_cmp(&pair[1]).is_lt()));
                }
            });
        });

        let all = store.all();
        assert_eq!(all.len(), 4 * 40);
        assert!(all
            .windows(2)
            .all(|pair| pair[0].schedule_cmp(&pair[1]).is_lt()));
    }
}
