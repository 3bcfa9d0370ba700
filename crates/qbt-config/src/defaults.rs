/// Location of the daemon configuration file inside the persistent volume.
pub const DEFAULT_CONFIG_PATH: &str = "/config/qBittorrent/qBittorrent.conf";

/// Location the daemon writes its log file to.
pub const DEFAULT_LOG_PATH: &str = "/config/qBittorrent/logs/qbittorrent.log";

/// Self-referential path resolving to the current process's standard output.
pub const STDOUT_TARGET: &str = "/proc/self/fd/1";

/// Name of the daemon executable looked up on `PATH`.
pub const DEFAULT_DAEMON_BINARY: &str = "qbittorrent-nox";

/// Default log filter expression used by the entrypoint.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration written on first start when no file exists yet.
pub const DEFAULT_CONFIG_CONTENTS: &str = include_str!("../assets/qBittorrent.conf");

/// Default logging format for the entrypoint.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
