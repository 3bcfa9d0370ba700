//! Error surface for resolving and executing the daemon.

use std::env::JoinPathsError;
use std::ffi::{NulError, OsString};
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Errors raised while handing the process over to the daemon.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The daemon executable was not found on the search path.
    #[error("failed to locate {binary} on the system PATH: {source}")]
    BinaryNotFound {
        /// Executable name that was looked up.
        binary: String,
        /// Underlying lookup error.
        #[source]
        source: which::Error,
    },
    /// The search path could not be rebuilt from its entries.
    #[error("failed to normalise the system PATH: {source}")]
    SearchPath {
        /// Underlying join error.
        #[source]
        source: JoinPathsError,
    },
    /// An argument or environment entry cannot be passed to `execve`.
    #[error("cannot pass {value:?} to the daemon: {source}")]
    InteriorNul {
        /// Offending value.
        value: OsString,
        /// Underlying conversion error.
        #[source]
        source: NulError,
    },
    /// The process image could not be replaced.
    #[error("execve failed to execute '{}': {source}", program.display())]
    Exec {
        /// Resolved daemon path.
        program: PathBuf,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
}
