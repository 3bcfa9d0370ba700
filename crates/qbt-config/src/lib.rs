//! Compiled-in settings shared by the qBittorrent container entrypoint.
//!
//! The entrypoint accepts no flags and reads no environment variables of its
//! own, so every setting here is a constant baked into the binary. [`Config`]
//! bundles those constants so the bootstrap stages can be pointed at a
//! scratch directory in tests without touching `/config`.
//!
//! The default `qBittorrent.conf` payload lives in
//! [`DEFAULT_CONFIG_CONTENTS`]. It is opaque data: changing a single byte
//! changes the behaviour of every first-time deployment.

mod config;
mod defaults;
mod logging;

pub use config::{Config, ConfigError};
pub use defaults::{
    DEFAULT_CONFIG_CONTENTS, DEFAULT_CONFIG_PATH, DEFAULT_DAEMON_BINARY, DEFAULT_LOG_FILTER,
    DEFAULT_LOG_PATH, STDOUT_TARGET, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
