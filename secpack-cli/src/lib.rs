//! Shared plumbing for the secpack command-line tools.

use std::process::ExitCode;

use secpack_core::{Clock, PackagerError};
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Exit status for a failed run: the error's class code, or 1 for anything
/// that did not come from the core.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PackagerError>()
        .map_or(1, PackagerError::exit_code)
}

/// Prints `err` with its context chain and converts it into an exit status.
pub fn fail(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {err:#}");
    ExitCode::from(exit_code_for(err))
}

/// Parses the clock override given by `--fake-now`.
pub fn clock_from_override(value: Option<&str>) -> Result<Clock, PackagerError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Clock::System),
        Some(v) => Clock::parse_override(v).ok_or_else(|| {
            PackagerError::Configuration(format!(
                "clock override must be YYYY-MM-DD or RFC 3339, got {v:?}"
            ))
        }),
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
