//! CSV and HTML task reports.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use tokio::fs;

use crate::entities::Task;
use crate::errors::{TasksError, TasksResult};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
}

impl std::str::FromStr for ExportFormat {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(TasksError::InvalidExportFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Html => write!(f, "html"),
        }
    }
}

fn status_label(task: &Task) -> &'static str {
    if task.completed {
        "Completed"
    } else {
        "Pending"
    }
}

fn csv_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn escape_csv(text: &str) -> String {
    text.replace('"', "\"\"")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render tasks as CSV with every field quoted
#[must_use]
pub fn to_csv(tasks: &[Task]) -> String {
    let mut out = String::from("Title,Description,Priority,Deadline,Category,Status,Created\n");
    for task in tasks {
        let deadline = task.deadline.map(csv_timestamp).unwrap_or_default();
        let _ = writeln!(
            out,
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
            escape_csv(&task.title),
            escape_csv(&task.description),
            task.priority,
            deadline,
            escape_csv(&task.category),
            status_label(task),
            csv_timestamp(task.created_at()),
        );
    }
    out
}

const HTML_HEAD: &str = r"<!DOCTYPE html>
<html><head><title>Task Report</title>
<style>
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
.urgent { background-color: #ff9999; }
.high { background-color: #ffcccc; }
.medium { background-color: #ffffcc; }
.low { background-color: #ccffcc; }
.completed { text-decoration: line-through; opacity: 0.6; }
</style></head><body>
<h1>Task Report</h1>
<table>
<tr><th>Title</th><th>Priority</th><th>Deadline</th><th>Category</th><th>Status</th></tr>
";

/// Render tasks as a standalone HTML table
#[must_use]
pub fn to_html(tasks: &[Task]) -> String {
    let mut out = String::from(HTML_HEAD);
    for task in tasks {
        let row_class = if task.completed {
            "completed".to_string()
        } else {
            task.priority.to_string()
        };
        let _ = writeln!(
            out,
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row_class,
            escape_html(&task.title),
            task.priority,
            escape_html(&task.formatted_deadline()),
            escape_html(&task.category),
            status_label(task),
        );
    }
    out.push_str("</table>\n</body></html>\n");
    out
}

/// Write a report in the requested format
pub async fn write_report(path: &Path, format: ExportFormat, tasks: &[Task]) -> TasksResult<()> {
    let content = match format {
        ExportFormat::Csv => to_csv(tasks),
        ExportFormat::Html => to_html(tasks),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| TasksError::FileWriteError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
