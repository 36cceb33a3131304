// Logging module - Logging infrastructure
use crate::domain::error::{HarnessError, HarnessResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive used when `RUST_LOG` is not set.
pub fn default_directive(log_level: &str, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        match log_level {
            "error" | "warn" | "info" | "debug" | "trace" => log_level,
            _ => "info",
        }
    };

    format!("tunnel_harness={},warn", level)
}

/// Initialize logging system.
///
/// Logs go to stderr; stdout carries relayed bytes and reports.
pub fn init_logging(log_level: &str, verbose: bool) -> HarnessResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true)
                .with_thread_ids(verbose)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .map_err(|e| HarnessError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("tunnel-harness logging initialized");
    Ok(())
}
