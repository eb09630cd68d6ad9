//! Logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize logging exactly once per process, to rolling files when a
//!   directory is given and to stderr otherwise.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and target.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or target is rejected.
//!
//! # See also
//! - docs/architecture/logging.md

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "flexpane";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: Option<PathBuf>,
    _logger: LoggerHandle,
}

/// Initializes logging with a level and an optional log directory.
///
/// `None` logs to stderr; `Some(dir)` writes size-rotated files under `dir`.
///
/// # Invariants
/// - Repeated calls with the same `level` and `log_dir` are idempotent.
/// - Repeated calls with a different `level` or `log_dir` are rejected.
/// - Initialization never panics.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when `log_dir` is blank or cannot be created.
/// - Returns an error when logger backend setup fails.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<(), String> {
    let normalized_level = normalize_level(level)?;
    let normalized_dir = log_dir.map(normalize_log_dir).transpose()?;

    if let Some(state) = LOGGING_STATE.get() {
        return check_matches(state, normalized_level, normalized_dir.as_deref());
    }

    let init_level = normalized_level;
    let init_dir = normalized_dir.clone();

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = Logger::try_with_str(init_level)
            .map_err(|err| format!("invalid log level `{init_level}`: {err}"))?;
        let logger = match init_dir.as_deref() {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|err| {
                    format!("failed to create log directory `{}`: {err}", dir.display())
                })?;
                logger
                    .log_to_file(
                        FileSpec::default()
                            .directory(dir)
                            .basename(LOG_FILE_BASENAME),
                    )
                    .rotate(
                        Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                        Naming::Numbers,
                        Cleanup::KeepLogFiles(MAX_LOG_FILES),
                    )
                    .write_mode(WriteMode::BufferAndFlush)
                    .append()
                    .format_for_files(flexi_logger::detailed_format)
            }
            None => logger
                .log_to_stderr()
                .format_for_stderr(flexi_logger::detailed_format),
        }
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

        install_panic_hook_once();

        info!(
            "event=app_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            build_mode(),
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=logging_init module=core status=ok level={} target={}",
            init_level,
            describe_target(init_dir.as_deref())
        );

        Ok(LoggingState {
            level: init_level,
            log_dir: init_dir,
            _logger: logger,
        })
    })?;

    check_matches(state, normalized_level, normalized_dir.as_deref())
}

fn check_matches(
    state: &LoggingState,
    level: &'static str,
    log_dir: Option<&Path>,
) -> Result<(), String> {
    if state.log_dir.as_deref() != log_dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            describe_target(state.log_dir.as_deref()),
            describe_target(log_dir)
        ));
    }
    if state.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        ));
    }
    Ok(())
}

fn describe_target(log_dir: Option<&Path>) -> String {
    match log_dir {
        Some(dir) => dir.display().to_string(),
        None => "stderr".to_string(),
    }
}

/// Returns active logging status metadata.
///
/// Returns `None` when logging has not been initialized.
/// Returns `(level, log_dir)` when logging is active; `log_dir` is `None`
/// for stderr logging.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

/// Rejects blank paths and anchors relative ones at the working directory.
fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() || log_dir.to_string_lossy().trim().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if log_dir.is_absolute() {
        return Ok(log_dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(log_dir))
        .map_err(|err| format!("cannot resolve relative log_dir `{}`: {err}", log_dir.display()))
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload text may carry request data; cap and flatten it.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
