//! Logging for LocalWrite.
//!
//! Every run writes `localwrite-<pid>.log` under the local data directory, or
//! wherever `--log-file` / `LOCALWRITE_LOG_FILE` point. `LOCALWRITE_LOG` takes
//! a level for the LocalWrite crates or a full filter directive. Setting it
//! (or `RUST_LOG`) also echoes to stdout, as do debug builds.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const CRATES: &[&str] = &[
    "localwrite_document",
    "localwrite_markdown",
    "localwrite_autoformat",
    "localwrite_history",
    "localwrite_config",
    "localwrite_session",
    "localwrite_bin",
];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program;
/// dropping it flushes and stops the background file writer.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let override_path = config
        .log_file_path
        .or_else(|| env::var_os("LOCALWRITE_LOG_FILE").map(PathBuf::from));
    let (log_dir, filename) = resolve_log_path(override_path, std::process::id());

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let stdout_enabled = env::var("LOCALWRITE_LOG").is_ok()
        || env::var("RUST_LOG").is_ok()
        || cfg!(debug_assertions);

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
/// Stdout only, with the same filters as [`init`]. Safe to call from every
/// test; later calls are no-ops.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

/// Split the log destination into a directory and a file name.
///
/// An override with an extension names the file itself; one without names the
/// directory that receives the default file name.
fn resolve_log_path(override_path: Option<PathBuf>, pid: u32) -> (PathBuf, String) {
    let filename = format!("localwrite-{pid}.log");

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("localwrite")
        .join("logs");

    (dir, filename)
}

/// File filter: uses the user-specified level if set, otherwise `warn`.
fn create_file_filter() -> EnvFilter {
    if env::var("LOCALWRITE_LOG").is_ok() || env::var("RUST_LOG").is_ok() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

fn create_filter() -> EnvFilter {
    if let Ok(localwrite_log) = env::var("LOCALWRITE_LOG") {
        return EnvFilter::new(expand_localwrite_log(&localwrite_log));
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    EnvFilter::new(expand_localwrite_log("info"))
}

/// Expand a `LOCALWRITE_LOG` value into a full filter directive.
///
/// - `LOCALWRITE_LOG=debug` becomes `warn,localwrite_document=debug,...`
/// - `LOCALWRITE_LOG=localwrite_history=trace` is used as-is
fn expand_localwrite_log(value: &str) -> String {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return value.to_string();
    }

    let mut directive = String::from("warn");
    for krate in CRATES {
        directive.push_str(&format!(",{krate}={value}"));
    }
    directive
}
