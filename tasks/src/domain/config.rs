//! Configuration domain facade.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::entities::SchedulerConfig;
use crate::errors::{TasksError, TasksResult};

/// Configuration domain facade
pub struct ConfigDomain {
    project_path: PathBuf,
    config_path: PathBuf,
}

impl ConfigDomain {
    /// Create a new config domain
    pub fn new(project_path: impl AsRef<Path>) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            config_path: project_path.as_ref().join(".tasks/config.json"),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration as stored on disk
    pub async fn load(&self) -> TasksResult<SchedulerConfig> {
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => {
                let config: SchedulerConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SchedulerConfig::default()),
            Err(e) => Err(TasksError::FileReadError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load configuration, apply environment overrides and validate
    pub async fn load_effective(&self) -> TasksResult<SchedulerConfig> {
        let mut config = self.load().await?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Save configuration
    pub async fn save(&self, config: &SchedulerConfig) -> TasksResult<()> {
        config.validate()?;

        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            TasksError::FileWriteError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Resolve the task data file against the project root
    #[must_use]
    pub fn data_path(&self, config: &SchedulerConfig) -> PathBuf {
        if config.data_file.is_absolute() {
            config.data_file.clone()
        } else {
            self.project_path.join(&config.data_file)
        }
    }

    /// Set the reminder scan interval
    pub async fn set_scan_interval(&self, secs: u64) -> TasksResult<()> {
        let mut config = self.load().await?;
        config.scan_interval_secs = secs;
        self.save(&config).await
    }
}
