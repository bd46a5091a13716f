//! File logging for the `shopping` binary.
//!
//! # Responsibility
//! - Validate the `--log-level` / `--log-dir` pair once, up front.
//! - Start size-rotated `shopping` log files with warnings mirrored to stderr.
//! - Record which command started the process and against which database.
//!
//! # Invariants
//! - A process has at most one logger; repeating the same settings is a no-op
//!   and different settings are rejected.
//! - Panic payloads reach the log as one capped line.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "shopping";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDir(String),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(String),
    AlreadyStarted { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => write!(f, "log directory must be absolute, got `{dir}`"),
            Self::CreateDir { dir, source } => {
                write!(f, "failed to create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::AlreadyStarted { active } => write!(
                f,
                "logging already started at level `{}` in `{}`",
                active.level,
                active.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    /// Parses CLI values; a missing level falls back to [`default_log_level`].
    pub fn new(level: Option<&str>, dir: &str) -> Result<Self, LoggingError> {
        let raw_level = level.unwrap_or_else(|| default_log_level()).trim();
        let level = match raw_level.parse::<LevelFilter>() {
            Ok(LevelFilter::Off) | Err(_) => {
                return Err(LoggingError::UnsupportedLevel(raw_level.to_string()))
            }
            Ok(level) => level,
        };

        let dir = Path::new(dir.trim());
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir.display().to_string()));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Starts file logging for `command` working on `db_path`.
///
/// # Errors
/// - The log directory cannot be created or the backend fails to start.
/// - A logger with different settings is already running.
pub fn init_logging(settings: &LogSettings, command: &str, db_path: &Path) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(settings))?;
    if active.settings != *settings {
        return Err(LoggingError::AlreadyStarted {
            active: active.settings.clone(),
        });
    }

    info!(
        "event=app_start module=logging status=ok command={command} db_path={} version={} level={} log_dir={}",
        db_path.display(),
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.dir.display()
    );
    Ok(())
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let handle = Logger::with(LogSpecification::builder().default(settings.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .duplicate_to_stderr(Duplicate::Warn)
        .format_for_files(flexi_logger::detailed_format)
        .format_for_stderr(flexi_logger::default_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            panic_summary(panic_info.payload())
        );
        previous_hook(panic_info);
    }));

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn panic_summary(payload: &(dyn Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");

    let mut line: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .take(MAX_PANIC_PAYLOAD_CHARS)
        .collect();
    if text.chars().count() > MAX_PANIC_PAYLOAD_CHARS {
        line.push_str("...");
    }
    line
}
