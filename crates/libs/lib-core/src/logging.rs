//! Logging initialization
//!
//! Wallet crates log through `tracing`; applications embedding them call [`init`] once at
//! startup. Output always goes to stderr, and additionally to a daily-rotated file when a
//! log directory is configured.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "lib_wallet=info,warn";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (e.g., "lib_wallet=debug,info")
    pub log_level: String,
    /// Directory for the rotated log file, if any
    pub log_dir: Option<PathBuf>,
    /// Emit ANSI colours on stderr
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_FILTER.to_string(),
            log_dir: None,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Load configuration from `RUST_LOG`, `WALLET_LOG_DIR` and `WALLET_LOG_ANSI`.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            log_dir: std::env::var("WALLET_LOG_DIR").ok().map(PathBuf::from),
            ansi: std::env::var("WALLET_LOG_ANSI")
                .map(|v| v != "0")
                .unwrap_or(true),
        }
    }
}

/// Initialize the global subscriber.
///
/// Returns the file writer guard when file logging is enabled; keep it alive for the
/// lifetime of the program or buffered lines are lost on exit.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, String> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(config.ansi);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create log directory {}: {}", dir.display(), e))?;
            let appender = tracing_appender::rolling::daily(dir, "wallet.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false); // No ANSI codes in log files
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = %config.log_level,
        log_dir = ?config.log_dir,
        "Wallet logging initialized"
    );

    Ok(guard)
}

/// Install a subscriber that writes through the test harness. Safe to call repeatedly.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
