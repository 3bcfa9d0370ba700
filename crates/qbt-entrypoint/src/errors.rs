//! Defines the unified error surface for the entrypoint pipeline.

use thiserror::Error;

use qbt_config::ConfigError;

use crate::config_file::ConfigFileError;
use crate::handoff::HandoffError;
use crate::log_redirect::LogRedirectError;
use crate::telemetry::TelemetryError;

/// Errors that abort startup before the daemon takes over.
#[derive(Debug, Error)]
pub enum EntrypointError {
    /// The compiled-in settings were unusable.
    #[error("invalid entrypoint settings: {source}")]
    Settings {
        /// Underlying validation error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configuration file could not be materialised.
    #[error("error setting up config: {source}")]
    ConfigFile {
        /// Underlying stage error.
        #[source]
        source: ConfigFileError,
    },
    /// The log symlink could not be put in place.
    #[error("error setting up log symlink: {source}")]
    LogRedirect {
        /// Underlying stage error.
        #[source]
        source: LogRedirectError,
    },
    /// The daemon could not be started.
    #[error("error executing {binary}: {source}")]
    Handoff {
        /// Daemon executable name.
        binary: String,
        /// Underlying stage error.
        #[source]
        source: HandoffError,
    },
}

impl From<ConfigError> for EntrypointError {
    fn from(source: ConfigError) -> Self {
        Self::Settings { source }
    }
}

impl From<TelemetryError> for EntrypointError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<ConfigFileError> for EntrypointError {
    fn from(source: ConfigFileError) -> Self {
        Self::ConfigFile { source }
    }
}

impl From<LogRedirectError> for EntrypointError {
    fn from(source: LogRedirectError) -> Self {
        Self::LogRedirect { source }
    }
}
