//! Process image replacement backends.

use std::convert::Infallible;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use nix::unistd::execve;
use tracing::info;

use super::HANDOFF_TARGET;
use super::errors::HandoffError;
use super::plan::HandoffPlan;

/// Abstraction over the final, non-returning handoff.
pub trait ProcessReplacer {
    /// Replaces the current process according to `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError`] when the replacement does not happen.
    fn replace(&self, plan: &HandoffPlan) -> Result<Infallible, HandoffError>;
}

/// Replacer that calls `execve(2)` through `nix`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemReplacer;

impl ProcessReplacer for SystemReplacer {
    fn replace(&self, plan: &HandoffPlan) -> Result<Infallible, HandoffError> {
        let program = to_cstring(plan.program().as_os_str())?;
        let argv = plan
            .argv()
            .iter()
            .map(|arg| to_cstring(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let envp = plan
            .env()
            .iter()
            .map(|(key, value)| environment_entry(key, value))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            target: HANDOFF_TARGET,
            program = %plan.program().display(),
            args = argv.len().saturating_sub(1),
            env_vars = envp.len(),
            "replacing process image"
        );
        match execve(&program, &argv, &envp) {
            Ok(never) => match never {},
            Err(source) => Err(HandoffError::Exec {
                program: plan.program().to_path_buf(),
                source,
            }),
        }
    }
}

fn to_cstring(value: &OsStr) -> Result<CString, HandoffError> {
    CString::new(value.as_bytes()).map_err(|source| HandoffError::InteriorNul {
        value: value.to_os_string(),
        source,
    })
}

fn environment_entry(key: &OsStr, value: &OsStr) -> Result<CString, HandoffError> {
    let mut entry = OsString::with_capacity(key.len() + value.len() + 1);
    entry.push(key);
    entry.push("=");
    entry.push(value);
    to_cstring(&entry)
}
