//! Settings consumed by the entrypoint bootstrap stages.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_DAEMON_BINARY, DEFAULT_LOG_FILTER, DEFAULT_LOG_PATH,
    STDOUT_TARGET, default_log_format,
};
use crate::logging::LogFormat;

/// Resolved entrypoint settings.
///
/// [`Config::default`] yields the values compiled into the binary. The
/// `with_*` methods exist so tests and embedders can redirect individual
/// paths; nothing on the command line or in the environment reaches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    config_path: Utf8PathBuf,
    log_path: Utf8PathBuf,
    stdout_target: Utf8PathBuf,
    daemon_binary: String,
    log_filter: String,
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: Utf8PathBuf::from(DEFAULT_CONFIG_PATH),
            log_path: Utf8PathBuf::from(DEFAULT_LOG_PATH),
            stdout_target: Utf8PathBuf::from(STDOUT_TARGET),
            daemon_binary: DEFAULT_DAEMON_BINARY.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Replaces the configuration file path.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Replaces the log file path.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Replaces the symlink target used for the log redirect.
    #[must_use]
    pub fn with_stdout_target(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.stdout_target = path.into();
        self
    }

    /// Replaces the daemon executable name.
    #[must_use]
    pub fn with_daemon_binary(mut self, binary: impl Into<String>) -> Self {
        self.daemon_binary = binary.into();
        self
    }

    /// Replaces the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Replaces the log output format.
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Path of the daemon configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Path of the daemon log file.
    #[must_use]
    pub fn log_path(&self) -> &Utf8Path {
        &self.log_path
    }

    /// Target the log file symlink points at.
    #[must_use]
    pub fn stdout_target(&self) -> &Utf8Path {
        &self.stdout_target
    }

    /// Daemon executable name resolved against `PATH`.
    #[must_use]
    pub fn daemon_binary(&self) -> &str {
        &self.daemon_binary
    }

    /// Log filter expression for the entrypoint's own telemetry.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format for the entrypoint's own telemetry.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks the settings before any stage touches the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a path is relative, when the config or
    /// log path has no parent directory, or when the daemon binary name is
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_file_path("config_path", &self.config_path)?;
        require_file_path("log_path", &self.log_path)?;
        require_absolute("stdout_target", &self.stdout_target)?;
        if self.daemon_binary.trim().is_empty() {
            return Err(ConfigError::EmptyDaemonBinary);
        }
        Ok(())
    }
}

fn require_absolute(field: &'static str, path: &Utf8Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            field,
            path: path.to_path_buf(),
        })
    }
}

fn require_file_path(field: &'static str, path: &Utf8Path) -> Result<(), ConfigError> {
    require_absolute(field, path)?;
    if path.parent().is_none() || path.file_name().is_none() {
        return Err(ConfigError::MissingParent {
            field,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Errors raised when entrypoint settings are unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A path setting was not absolute.
    #[error("{field} must be an absolute path, got '{path}'")]
    RelativePath {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        path: Utf8PathBuf,
    },
    /// A file path had no parent directory to create.
    #[error("{field} '{path}' has no parent directory")]
    MissingParent {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        path: Utf8PathBuf,
    },
    /// The daemon executable name was blank.
    #[error("daemon binary name must not be empty")]
    EmptyDaemonBinary,
}
