//! Materialises the default daemon configuration on first start.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::fs::{
    WriteOutcome, create_parent_directories, is_dangling_link, write_new_file, write_through_link,
};

const CONFIG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::config_file");

/// State of the configuration file after bootstrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    /// The default payload was written.
    Created,
    /// A file was already present and was left untouched.
    AlreadyPresent,
}

/// Errors raised while materialising the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The configuration directory could not be created.
    #[error("failed to create config directory for '{path}': {source}")]
    CreateDirectory {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The default payload could not be written.
    #[error("failed to write initial config file '{path}': {source}")]
    Write {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Ensures a configuration file exists at `path`.
///
/// When nothing exists at `path`, its parent directories are created and
/// `default_contents` is written verbatim. A dangling symlink at `path` is
/// followed and the file is created at its target. An existing file is never read,
/// merged, or rewritten, so repeated calls are harmless.
///
/// # Errors
///
/// Returns [`ConfigFileError::CreateDirectory`] when the parent directories
/// cannot be created and [`ConfigFileError::Write`] when the payload cannot
/// be written.
pub fn ensure_config_exists(
    path: &Path,
    default_contents: &str,
) -> Result<ConfigStatus, ConfigFileError> {
    match fs::metadata(path) {
        Ok(_) => return Ok(ConfigStatus::AlreadyPresent),
        Err(error) if is_absent(&error) => {}
        Err(error) => {
            // Only a definite absence triggers materialisation.
            warn!(
                target: CONFIG_TARGET,
                path = %path.display(),
                error = %error,
                "could not inspect config file; leaving it untouched"
            );
            return Ok(ConfigStatus::AlreadyPresent);
        }
    }

    create_parent_directories(path).map_err(|source| ConfigFileError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;

    // A dangling link is absent content, not an existing file: follow it.
    let outcome = if is_dangling_link(path) {
        write_through_link(path, default_contents.as_bytes()).map(|()| WriteOutcome::Written)
    } else {
        write_new_file(path, default_contents.as_bytes())
    }
    .map_err(|source| ConfigFileError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    match outcome {
        WriteOutcome::Written => {
            info!(
                target: CONFIG_TARGET,
                path = %path.display(),
                "copied default config"
            );
            Ok(ConfigStatus::Created)
        }
        WriteOutcome::AlreadyExists => Ok(ConfigStatus::AlreadyPresent),
    }
}

fn is_absent(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
