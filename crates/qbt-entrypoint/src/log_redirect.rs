//! Routes the daemon's log file to the container's standard output.
//!
//! The daemon can only log to a file path. Pointing that path at
//! `/proc/self/fd/1` hands every log line straight to whatever collects the
//! container's stdout. The link resolves against the process that opens it,
//! and the daemon inherits this process's identity and descriptors through
//! `execve`, so the link is recreated on every start.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::fs::create_parent_directories;

const REDIRECT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::log_redirect");

/// Errors raised while redirecting the log file.
#[derive(Debug, Error)]
pub enum LogRedirectError {
    /// The log directory could not be created.
    #[error("failed to create log directory for '{path}': {source}")]
    CreateDirectory {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The previous entry at the log path could not be removed.
    #[error("failed to remove existing log file '{path}': {source}")]
    Remove {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The symlink could not be created.
    #[error("failed to create symlink '{path}' to '{target}': {source}")]
    Symlink {
        /// Log file path.
        path: PathBuf,
        /// Symlink target.
        target: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Replaces whatever sits at `log_path` with a symlink to `stdout_target`.
///
/// # Errors
///
/// Returns [`LogRedirectError`] when the parent directory cannot be created,
/// when an existing entry cannot be removed (a non-empty directory is never
/// removed recursively), or when the symlink cannot be created.
pub fn ensure_log_redirect(log_path: &Path, stdout_target: &Path) -> Result<(), LogRedirectError> {
    create_parent_directories(log_path).map_err(|source| LogRedirectError::CreateDirectory {
        path: log_path.to_path_buf(),
        source,
    })?;

    remove_existing(log_path).map_err(|source| LogRedirectError::Remove {
        path: log_path.to_path_buf(),
        source,
    })?;

    symlink(stdout_target, log_path).map_err(|source| LogRedirectError::Symlink {
        path: log_path.to_path_buf(),
        target: stdout_target.to_path_buf(),
        source,
    })?;

    info!(
        target: REDIRECT_TARGET,
        source = %log_path.display(),
        target_path = %stdout_target.display(),
        "symlinked log file to stdout"
    );
    Ok(())
}

/// Unlinks the entry at `path`; an empty directory is removed as well.
fn remove_existing(path: &Path) -> io::Result<()> {
    let unlink_error = match fs::remove_file(path) {
        Ok(()) => return Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => error,
    };

    let is_directory = fs::symlink_metadata(path)
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if !is_directory {
        return Err(unlink_error);
    }

    match fs::remove_dir(path) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error),
        _ => Ok(()),
    }
}
