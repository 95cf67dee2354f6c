//! Smart tasks CLI - priority-ordered tasks with deadline reminders.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;

use smart_tasks::domain::{parse_deadline, ConfigDomain, NewTask, TaskEdit, TasksDomain};
use smart_tasks::entities::{Task, TaskPriority};
use smart_tasks::errors::TasksError;
use smart_tasks::export::{write_report, ExportFormat};
use smart_tasks::reminders::{
    ChannelSink, FanoutSink, ReminderScanner, ReminderSink, ScannerConfig, TracingSink,
};
use smart_tasks::storage::{JsonFileRepository, TaskRepository};
use smart_tasks::store::TaskStore;
use smart_tasks::ui;

#[derive(Parser)]
#[command(name = "smart-tasks")]
#[command(about = "Priority-ordered tasks with deadline reminders", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        #[arg(short, long)]
        title: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority (low, medium, high, urgent)
        #[arg(short, long)]
        priority: Option<String>,

        /// Deadline as "YYYY-MM-DD HH:MM" in local time
        #[arg(long)]
        deadline: Option<String>,

        /// Category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List tasks in schedule order
    List(ListArgs),

    /// Mark a task completed
    Complete {
        /// Task ID or unique prefix
        id: String,
    },

    /// Mark a completed task pending again
    Reopen {
        /// Task ID or unique prefix
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task ID or unique prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,

        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a task
    Remove {
        /// Task ID or unique prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List categories in use
    Categories,

    /// Show task statistics
    Stats {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Horizon for the "due soon" count
        #[arg(long)]
        hours: Option<i64>,
    },

    /// Export tasks to a report file
    Export {
        /// Output format (csv, html)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the reminder scanner until interrupted
    Watch {
        /// Override the scan interval
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Show or change scheduler configuration
    Config {
        /// Persist a new scan interval
        #[arg(long)]
        scan_interval_secs: Option<u64>,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Only tasks with this priority
    #[arg(short, long)]
    priority: Option<String>,

    /// Only tasks in this category
    #[arg(short, long)]
    category: Option<String>,

    #[arg(long, group = "state")]
    pending: bool,

    #[arg(long, group = "state")]
    completed: bool,

    /// Pending tasks due today
    #[arg(long, group = "state")]
    today: bool,

    #[arg(long, group = "state")]
    overdue: bool,
}

fn get_project_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn parse_priority(value: Option<&str>) -> Result<Option<TaskPriority>, TasksError> {
    value.map(str::parse).transpose()
}

fn parse_optional_deadline(value: Option<&str>) -> Result<Option<chrono::DateTime<chrono::Utc>>, TasksError> {
    value.map(parse_deadline).transpose()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project_path = get_project_path(cli.project);
    let config_domain = ConfigDomain::new(&project_path);
    let config = config_domain
        .load_effective()
        .await
        .with_context(|| format!("loading {}", config_domain.config_path().display()))?;

    let data_path = config_domain.data_path(&config);
    let repository = Arc::new(JsonFileRepository::new(&data_path));
    let store = Arc::new(TaskStore::new());
    let tasks_domain = TasksDomain::new(
        Arc::clone(&store),
        Arc::clone(&repository) as Arc<dyn TaskRepository>,
    );
    tasks_domain
        .load()
        .await
        .with_context(|| format!("loading tasks from {}", data_path.display()))?;

    match cli.command {
        Commands::Add {
            title,
            description,
            priority,
            deadline,
            category,
        } => {
            let task = tasks_domain.add_task(NewTask {
                title,
                description: description.unwrap_or_default(),
                priority: parse_priority(priority.as_deref())?.unwrap_or_default(),
                deadline: parse_optional_deadline(deadline.as_deref())?,
                category,
            })?;
            ui::print_success(&format!("Added task {} - {}", task.id().short(), task.title));
        }

        Commands::List(args) => {
            let tasks = list_tasks(&tasks_domain, &args)?;
            if tasks.is_empty() {
                ui::print_info("No tasks found");
            } else {
                println!("{}", ui::task_table(&tasks, chrono::Utc::now()));
                println!();
                ui::print_info(&format!("{} task(s) total", tasks.len()));
            }
        }

        Commands::Complete { id } => {
            let task = tasks_domain.set_completed(&id, true)?;
            ui::print_success(&format!("Completed: {}", task.title));
        }

        Commands::Reopen { id } => {
            let task = tasks_domain.set_completed(&id, false)?;
            ui::print_success(&format!("Reopened: {}", task.title));
        }

        Commands::Edit {
            id,
            title,
            description,
            priority,
            deadline,
            clear_deadline,
            category,
        } => {
            let deadline = if clear_deadline {
                Some(None)
            } else {
                parse_optional_deadline(deadline.as_deref())?.map(Some)
            };
            let edit = TaskEdit {
                title,
                description,
                priority: parse_priority(priority.as_deref())?,
                deadline,
                category,
                completed: None,
            };
            let task = tasks_domain.edit_task(&id, edit)?;
            ui::print_success(&format!("Updated task {}", task.id().short()));
            println!("{task}");
        }

        Commands::Remove { id, yes } => {
            let task = tasks_domain.get_task(&id)?;
            if !yes && !confirm_removal(&task)? {
                ui::print_info("Cancelled");
                return Ok(());
            }
            let removed = tasks_domain.remove_task(&task.id().to_string())?;
            ui::print_success(&format!("Removed: {}", removed.title));
        }

        Commands::Categories => {
            let categories = store.categories();
            if categories.is_empty() {
                ui::print_info("No categories yet");
            }
            for category in categories {
                println!("{category}");
            }
        }

        Commands::Stats { json, hours } => {
            let hours = hours.unwrap_or(config.due_soon_hours);
            let summary = tasks_domain.statistics().summary(hours);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                ui::display_stats(&summary);
            }
        }

        Commands::Export { format, output } => {
            let format: ExportFormat = format.parse()?;
            let tasks = store.all();
            write_report(&output, format, &tasks).await?;
            ui::print_success(&format!(
                "Exported {} task(s) as {} to {}",
                tasks.len(),
                format,
                output.display()
            ));
        }

        Commands::Watch { interval_secs } => {
            let mut scanner_config = ScannerConfig::from(&config);
            if let Some(secs) = interval_secs {
                if secs == 0 {
                    return Err(TasksError::InvalidArgument {
                        reason: "interval must be at least one second".to_string(),
                    }
                    .into());
                }
                scanner_config.interval = Duration::from_secs(secs);
            }
            watch(&store, scanner_config).await?;
        }

        Commands::Config { scan_interval_secs } => {
            if let Some(secs) = scan_interval_secs {
                config_domain.set_scan_interval(secs).await?;
                ui::print_success(&format!("Scan interval set to {secs}s"));
            } else {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    if tasks_domain.save_if_changed().await? {
        tracing::debug!(path = %data_path.display(), "Task list saved");
    }

    Ok(())
}

fn list_tasks(domain: &TasksDomain, args: &ListArgs) -> Result<Vec<Task>, TasksError> {
    let store = domain.store();
    let mut tasks = if args.pending {
        store.pending()
    } else if args.completed {
        store.completed()
    } else if args.today {
        store.due_today()
    } else if args.overdue {
        store.overdue()
    } else {
        store.all()
    };

    if let Some(priority) = parse_priority(args.priority.as_deref())? {
        tasks.retain(|t| t.priority == priority);
    }
    if let Some(category) = &args.category {
        tasks.retain(|t| t.category.eq_ignore_ascii_case(category));
    }
    Ok(tasks)
}

fn confirm_removal(task: &Task) -> Result<bool, TasksError> {
    Confirm::new()
        .with_prompt(format!("Remove '{}'?", task.title))
        .default(false)
        .interact()
        .map_err(|e| TasksError::Internal {
            reason: format!("confirmation prompt failed: {e}"),
        })
}

async fn watch(store: &Arc<TaskStore>, config: ScannerConfig) -> Result<(), TasksError> {
    let (channel, mut events) = ChannelSink::channel();
    let sink = FanoutSink::new(vec![Arc::new(TracingSink) as Arc<dyn ReminderSink>])
        .with_sink(Arc::new(channel));

    ui::print_info(&format!(
        "Watching {} task(s), scanning every {}s. Press Ctrl-C to stop.",
        store.pending().len(),
        config.interval.as_secs()
    ));

    let scanner = ReminderScanner::start(Arc::clone(store), Arc::new(sink), config)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(event) => ui::print_reminder(&event),
                None => break,
            },
        }
    }

    scanner.stop().await;
    ui::print_info(&format!("Stopped after {} scan(s)", scanner.tick_count()));
    Ok(())
}
