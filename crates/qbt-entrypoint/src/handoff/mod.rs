//! Transfers control to the daemon by replacing the process image.
//!
//! The entrypoint never supervises the daemon. Once the binary is resolved
//! the process calls `execve(2)`: the daemon keeps this PID and every open
//! descriptor, including the stdout the log symlink points at. Nothing runs
//! after a successful handoff.

mod errors;
mod plan;
mod replacer;

use std::convert::Infallible;
use std::ffi::OsString;

pub use errors::HandoffError;
pub use plan::{HandoffPlan, SearchPath};
pub use replacer::{ProcessReplacer, SystemReplacer};

pub(crate) const HANDOFF_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handoff");

/// Resolves `binary` on `PATH` and replaces the current process with it.
///
/// `forwarded_args` excludes this process's own argument 0; every element
/// is passed to the daemon verbatim and in order. `environment` is handed
/// over unchanged.
///
/// # Errors
///
/// Returns [`HandoffError`] when the binary cannot be found or the process
/// image cannot be replaced. On success this function does not return.
pub fn exec_daemon<I>(
    binary: &str,
    forwarded_args: I,
    environment: Vec<(OsString, OsString)>,
) -> Result<Infallible, HandoffError>
where
    I: IntoIterator<Item = OsString>,
{
    exec_daemon_with(
        &SystemReplacer,
        &SearchPath::from_env(),
        binary,
        forwarded_args,
        environment,
    )
}

/// Resolves `binary` against `search` and hands the plan to `replacer`.
///
/// # Errors
///
/// Returns [`HandoffError::BinaryNotFound`] without invoking `replacer` when
/// resolution fails, otherwise whatever `replacer` reports.
pub fn exec_daemon_with<R, I>(
    replacer: &R,
    search: &SearchPath,
    binary: &str,
    forwarded_args: I,
    environment: Vec<(OsString, OsString)>,
) -> Result<Infallible, HandoffError>
where
    R: ProcessReplacer + ?Sized,
    I: IntoIterator<Item = OsString>,
{
    let plan = HandoffPlan::resolve(binary, forwarded_args, search, environment)?;
    replacer.replace(&plan)
}
