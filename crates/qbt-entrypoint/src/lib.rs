//! Container entrypoint for the qBittorrent daemon.
//!
//! The entrypoint prepares the persistent volume and then becomes the
//! daemon. Startup runs three stages in order, aborting on the first error:
//!
//! 1. **Config file**: write the default `qBittorrent.conf` if, and only
//!    if, no file exists yet ([`ensure_config_exists`]).
//! 2. **Log redirect**: replace the daemon's log file with a symlink to
//!    `/proc/self/fd/1` so its log reaches the container's stdout
//!    ([`ensure_log_redirect`]).
//! 3. **Handoff**: resolve `qbittorrent-nox` on `PATH` and `execve` it with
//!    this process's arguments and environment ([`exec_daemon`]).
//!
//! Every stage is idempotent, so a failed start is simply retried by the
//! next container start. There is no supervision: after the handoff this
//! crate's code is gone from the process.

mod config_file;
mod errors;
mod fs;
mod handoff;
mod launch;
mod log_redirect;
mod report;
mod telemetry;

pub use config_file::{ConfigFileError, ConfigStatus, ensure_config_exists};
pub use errors::EntrypointError;
pub use handoff::{
    HandoffError, HandoffPlan, ProcessReplacer, SearchPath, SystemReplacer, exec_daemon,
    exec_daemon_with,
};
pub use launch::run_entrypoint;
pub use log_redirect::{LogRedirectError, ensure_log_redirect};
pub use report::{Stage, StageReporter, StructuredStageReporter};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
