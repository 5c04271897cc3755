//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so that command output on stdout stays clean.
//!
//! # Log Levels
//!
//! - `warn`: validation warnings (the default level)
//! - `info`: command summaries (`-v`)
//! - `debug`: pipeline stages and discovery steps (`-vv`)
//! - `trace`: individual lookups during resolution (`-vvv`)
//!
//! `RUST_LOG` overrides the level chosen from the command line.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: console::colors_enabled_stderr(),
        }
    }
}

impl LogConfig {
    /// - 0 (no `-v`): warn level
    /// - 1 (`-v`): info level
    /// - 2 (`-vv`): debug level
    /// - 3+ (`-vvv`): trace level
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Installs the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()?;
    Ok(())
}

/// Builds an `EnvFilter` for `level`, respecting `RUST_LOG`. Other crates
/// stay at warn.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,brand={level},brand_yml={level}",
            level = level.as_str().to_lowercase()
        ))
    })
}
