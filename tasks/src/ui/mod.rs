//! Terminal UI helpers for task display.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::domain::StatsSummary;
use crate::entities::{Task, TaskPriority};
use crate::reminders::{ReminderEvent, Severity};

/// Get colored priority string
pub fn priority_colored(priority: TaskPriority) -> String {
    match priority {
        TaskPriority::Low => "low".dimmed().to_string(),
        TaskPriority::Medium => "medium".normal().to_string(),
        TaskPriority::High => "high".yellow().to_string(),
        TaskPriority::Urgent => "urgent".red().bold().to_string(),
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::DarkGrey,
        TaskPriority::Medium => Color::White,
        TaskPriority::High => Color::Yellow,
        TaskPriority::Urgent => Color::Red,
    }
}

/// Create a table for displaying tasks
pub fn task_table(tasks: &[Task], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Header
    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Title").fg(Color::Cyan),
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("Deadline").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
    ]);

    for task in tasks {
        let (status, status_color) = if task.completed {
            ("done", Color::Green)
        } else if task.is_overdue_at(now) {
            ("overdue", Color::Red)
        } else if task.is_due_today_at(now) {
            ("due today", Color::Yellow)
        } else {
            ("pending", Color::White)
        };

        table.add_row(vec![
            Cell::new(task.id().short()).fg(Color::DarkGrey),
            Cell::new(&task.title),
            Cell::new(task.priority.to_string()).fg(priority_color(task.priority)),
            Cell::new(task.formatted_deadline()),
            Cell::new(&task.category),
            Cell::new(status).fg(status_color),
        ]);
    }

    table
}

/// Create a two-column table from counted keys
pub fn count_table<K: std::fmt::Display>(
    heading: &str,
    counts: impl IntoIterator<Item = (K, usize)>,
) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new(heading).fg(Color::Cyan),
        Cell::new("Tasks").fg(Color::Cyan),
    ]);
    for (key, count) in counts {
        table.add_row(vec![Cell::new(key.to_string()), Cell::new(count)]);
    }
    table
}

/// Display aggregate statistics
pub fn display_stats(summary: &StatsSummary) {
    println!("{}", "═".repeat(60).dimmed());
    println!("{}", "Task Statistics".cyan().bold());
    println!("{}", "═".repeat(60).dimmed());
    println!();

    println!("{}: {}", "Total".bold(), summary.total);
    println!(
        "{}: {}",
        "Completed".bold(),
        summary.completed.to_string().green()
    );
    println!("{}: {}", "Pending".bold(), summary.pending);
    println!(
        "{}: {}",
        "Overdue".bold(),
        summary.overdue.to_string().red()
    );
    println!(
        "{}: {:.1}%",
        "Completion rate".bold(),
        summary.completion_rate
    );
    println!(
        "{}: {}",
        format!("Due in next {}h", summary.due_soon_hours).bold(),
        summary.due_soon
    );
    println!(
        "{}: {:.1}h",
        "Average planned time".bold(),
        summary.average_planned_hours
    );

    if !summary.by_priority.is_empty() {
        println!();
        let rows = summary
            .by_priority
            .iter()
            .rev()
            .map(|(priority, count)| (priority_colored(*priority), *count));
        println!("{}", count_table("Priority", rows));
    }

    if !summary.by_category.is_empty() {
        println!();
        let rows = summary
            .by_category
            .iter()
            .map(|(category, count)| (category.clone(), *count));
        println!("{}", count_table("Category", rows));
    }

    println!();
}

/// Print a reminder as it arrives from the scanner
pub fn print_reminder(event: &ReminderEvent) {
    let at = event.timestamp().with_timezone(&Local).format("%H:%M");
    let heading = match event.severity() {
        Severity::Warning => format!("⏰ {}", event.title()).yellow().bold(),
        Severity::Critical => format!("⚠ {}", event.title()).red().bold(),
    };
    println!("{} {} {}", format!("[{at}]").dimmed(), heading, event.message());
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
