//! Binary entrypoint: prepare the volume, then become `qbittorrent-nox`.
//!
//! Every argument after the program name is forwarded to the daemon. This
//! binary only returns when startup fails, in which case the error is
//! written to stderr and the exit status is 1.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let error = match qbt_entrypoint::run_entrypoint() {
        Ok(never) => match never {},
        Err(error) => error,
    };
    // Nothing useful remains to be done if stderr itself is gone.
    writeln!(io::stderr().lock(), "{error}").ok();
    ExitCode::FAILURE
}
