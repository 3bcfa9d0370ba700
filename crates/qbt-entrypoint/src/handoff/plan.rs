//! Resolves the daemon binary and assembles its argument vector.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::errors::HandoffError;

/// Search path the daemon binary is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    path: Option<OsString>,
    cwd: PathBuf,
}

impl SearchPath {
    /// Builds a search path from an explicit `PATH` value and working directory.
    #[must_use]
    pub fn new(path: Option<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            path,
            cwd: cwd.into(),
        }
    }

    /// Captures the process's `PATH` and working directory.
    ///
    /// A working directory that cannot be read falls back to `/`.
    #[must_use]
    pub fn from_env() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::new(env::var_os("PATH"), cwd)
    }

    /// Directory relative entries are resolved against.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// `PATH` entries with relative components anchored at [`Self::cwd`].
    ///
    /// An empty entry denotes the working directory, as in POSIX shells.
    fn absolute_entries(&self) -> Option<Vec<PathBuf>> {
        let path = self.path.as_ref()?;
        Some(
            env::split_paths(path)
                .map(|entry| self.cwd.join(entry))
                .collect(),
        )
    }
}

/// Everything `execve` needs to start the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffPlan {
    program: PathBuf,
    argv: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
}

impl HandoffPlan {
    /// Resolves `binary` against `search` and builds the handoff vectors.
    ///
    /// `argv[0]` is the absolute daemon path; the forwarded arguments follow
    /// unchanged and in order.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::BinaryNotFound`] when no executable named
    /// `binary` is reachable through `search`.
    pub fn resolve<I>(
        binary: &str,
        forwarded_args: I,
        search: &SearchPath,
        environment: Vec<(OsString, OsString)>,
    ) -> Result<Self, HandoffError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let entries = search
            .absolute_entries()
            .map(env::join_paths)
            .transpose()
            .map_err(|source| HandoffError::SearchPath { source })?;
        let found = which::which_in(binary, entries, search.cwd()).map_err(|source| {
            HandoffError::BinaryNotFound {
                binary: binary.to_owned(),
                source,
            }
        })?;
        // Joining onto the working directory leaves absolute paths untouched.
        let program = search.cwd().join(found);

        let mut argv = vec![program.clone().into_os_string()];
        argv.extend(forwarded_args);
        Ok(Self {
            program,
            argv,
            env: environment,
        })
    }

    /// Absolute path of the daemon executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument vector, starting with the program path.
    #[must_use]
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    /// Environment handed to the daemon.
    #[must_use]
    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }
}
