//! Logging setup for Lector hosts with file output and optional stdout.
//!
//! Lector is embedded in a larger application, so nothing here runs on its own.
//! Hosts that do not install their own subscriber call [`init`] once at startup;
//! tests call [`test`].
//!
//! ## Environment Variables
//!
//! 1. **`LECTOR_LOG`** (highest priority) - Lector-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for lector crates
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/lector/logs/lector-<pid>.log`
//! - macOS: `~/Library/Application Support/lector/logs/lector-12345.log`
//! - Linux: `~/.local/share/lector/logs/lector-12345.log`
//!
//! Override with [`LogConfig::log_file_path`].

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Crates whose level follows a bare `LECTOR_LOG=<level>`.
const LECTOR_CRATES: &[&str] = &["lector", "lector_service", "lector_log"];

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    /// A file path (has an extension) or a directory to place the default file name in.
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// Respects the priority described in the module docs:
/// `LECTOR_LOG` > `RUST_LOG` > default settings.
///
/// The returned [`LogGuard`] must be held for the lifetime of the host --
/// dropping it flushes and stops the background file writer.
///
/// Fails if a global subscriber is already installed; hosts with their own
/// subscriber should not call this.
pub fn init(config: LogConfig) -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let stdout_enabled =
        env::var("LECTOR_LOG").is_ok() || env::var("RUST_LOG").is_ok() || cfg!(debug_assertions);

    let stdout_layer = if stdout_enabled {
        Some(fmt::layer().with_filter(create_filter()))
    } else {
        None
    };

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Initialize logging for tests.
///
/// Stdout-only (test writer, no file output). Will not crash if called multiple
/// times or if logging is already initialized by another test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("lector-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lector")
        .join("logs");

    (dir, filename)
}

/// File filter: uses the user-specified level if set, otherwise `warn`.
fn create_file_filter() -> EnvFilter {
    if env::var("LECTOR_LOG").is_ok() || env::var("RUST_LOG").is_ok() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// Create the [`EnvFilter`] from `LECTOR_LOG`, then `RUST_LOG`, then defaults.
fn create_filter() -> EnvFilter {
    if let Ok(lector_log) = env::var("LECTOR_LOG") {
        return EnvFilter::new(expand_lector_log(&lector_log));
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    EnvFilter::new(expand_lector_log("info"))
}

/// Expand a `LECTOR_LOG` value into a full filter directive string.
///
/// - `LECTOR_LOG=debug` becomes `warn,lector=debug,lector_service=debug,...`
/// - `LECTOR_LOG=lector=trace,lector_service=debug` is used as-is
fn expand_lector_log(lector_log: &str) -> String {
    if lector_log.contains('=') || lector_log.contains(':') || lector_log.contains(',') {
        return lector_log.to_string();
    }

    let mut directives = String::from("warn");
    for krate in LECTOR_CRATES {
        directives.push_str(&format!(",{krate}={lector_log}"));
    }
    directives
}
