use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{MeshGuardError, MeshGuardResult};

/// Line format for log files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where and how to write logs
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "meshguard.log".to_string(),
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Path of the current log file before rotation suffixes
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Initialize the logging system
/// Logs are written to daily rotated files only (no console output).
/// The library never calls this itself; applications opt in.
pub fn init_logging(config: &LogConfig) -> MeshGuardResult<()> {
    ensure_dir(&config.dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.dir, &config.file_name);

    // Default to the configured level, can be overridden with RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(file_appender)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init(),
    };
    result.map_err(|e| MeshGuardError::Config(format!("Logging already initialized: {}", e)))?;

    tracing::info!("Logging system initialized");
    tracing::info!("Log files location: {}", config.log_path().display());

    Ok(())
}

fn ensure_dir(dir: &Path) -> MeshGuardResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        MeshGuardError::Config(format!("Cannot create log directory {}: {}", dir.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_paths() {
        let config = LogConfig::default().with_dir("/var/log/meshguard");
        assert_eq!(config.log_path(), PathBuf::from("/var/log/meshguard/meshguard.log"));
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
