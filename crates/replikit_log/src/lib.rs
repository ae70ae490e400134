//! `replikit_log` v1:
//! File log sink for replication runs.
//!
//! Records are written as `<timestamp> - <LEVEL> - <message>`, one per line,
//! appended to a plain text file.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Default log file name, relative to the working directory.
pub const C_LOG_FILE_DEFAULT: &str = "copy_log.txt";
/// Default filter directive.
pub const C_LOG_LEVEL_DEFAULT: &str = "info";
const C_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `init_logging`.
#[derive(Debug, Clone)]
pub struct SpecLogOptions {
    /// Log file, opened in append mode.
    pub path_log_file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `debug`).
    pub level: String,
}

impl Default for SpecLogOptions {
    fn default() -> Self {
        Self {
            path_log_file: PathBuf::from(C_LOG_FILE_DEFAULT),
            level: C_LOG_LEVEL_DEFAULT.to_string(),
        }
    }
}

/// Logger setup failures.
#[derive(Debug)]
pub enum LogInitError {
    /// Log file could not be opened for appending.
    OpenFailed {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// Level directive is not a valid filter.
    InvalidLevel(String),
    /// A global subscriber is already installed.
    AlreadyInitialized(String),
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed { path, message } => {
                write!(f, "Failed to open log file {}: {message}", path.display())
            }
            Self::InvalidLevel(msg) => write!(f, "Invalid log level: {msg}"),
            Self::AlreadyInitialized(msg) => write!(f, "Logger already initialized: {msg}"),
        }
    }
}

impl std::error::Error for LogInitError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Formatting

/// Event formatter producing `<timestamp> - <LEVEL> - <message>`.
#[derive(Debug, Clone)]
pub struct FormatterLogRecord {
    timer: ChronoLocal,
}

impl Default for FormatterLogRecord {
    fn default() -> Self {
        Self {
            timer: ChronoLocal::new(C_TIMESTAMP_FORMAT.to_string()),
        }
    }
}

impl<S, N> FormatEvent<S, N> for FormatterLogRecord
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Setup

/// Open (or create) the log file for appending.
pub fn open_log_file(spec_log_options: &SpecLogOptions) -> Result<File, LogInitError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&spec_log_options.path_log_file)
        .map_err(|e| LogInitError::OpenFailed {
            path: spec_log_options.path_log_file.clone(),
            message: e.to_string(),
        })
}

/// Build the file layer without installing it.
pub fn build_file_layer<S>(
    file_log: File,
) -> tracing_subscriber::fmt::Layer<S, format::DefaultFields, FormatterLogRecord, Mutex<File>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(FormatterLogRecord::default())
        .with_writer(Mutex::new(file_log))
}

/// Filter from `RUST_LOG`, falling back to `level`.
pub fn build_env_filter(level: &str) -> Result<EnvFilter, LogInitError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LogInitError::InvalidLevel(format!("`{level}` ({e})")))
}

/// Install the global subscriber writing to the configured log file.
pub fn init_logging(spec_log_options: &SpecLogOptions) -> Result<(), LogInitError> {
    let filter = build_env_filter(&spec_log_options.level)?;
    let file_log = open_log_file(spec_log_options)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(build_file_layer(file_log))
        .try_init()
        .map_err(|e| LogInitError::AlreadyInitialized(e.to_string()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    use super::{LogInitError, SpecLogOptions, build_file_layer, open_log_file};

    fn read_lines(spec_log_options: &SpecLogOptions) -> Vec<String> {
        std::fs::read_to_string(&spec_log_options.path_log_file)
            .expect("read log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn records_follow_timestamp_level_message_layout() {
        let tmp = TempDir::new().expect("tempdir");
        let spec_log_options = SpecLogOptions {
            path_log_file: tmp.path().join("copy_log.txt"),
            ..SpecLogOptions::default()
        };
        let file_log = open_log_file(&spec_log_options).expect("open log");
        let subscriber = tracing_subscriber::registry().with(build_file_layer(file_log));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Copied: /src/a.txt to /dst");
            tracing::error!("Access Denied: /src/b.txt. Skipping...");
        });

        let l_lines = read_lines(&spec_log_options);
        assert_eq!(l_lines.len(), 2);

        let l_parts = l_lines[0].splitn(3, " - ").collect::<Vec<_>>();
        assert_eq!(l_parts.len(), 3);
        // 2024-09-26 10:00:00,123
        assert_eq!(l_parts[0].len(), 23);
        assert_eq!(&l_parts[0][19..20], ",");
        assert_eq!(l_parts[1], "INFO");
        assert_eq!(l_parts[2], "Copied: /src/a.txt to /dst");

        assert!(l_lines[1].ends_with(" - ERROR - Access Denied: /src/b.txt. Skipping..."));
    }

    #[test]
    fn log_file_is_appended_not_truncated() {
        let tmp = TempDir::new().expect("tempdir");
        let spec_log_options = SpecLogOptions {
            path_log_file: tmp.path().join("copy_log.txt"),
            ..SpecLogOptions::default()
        };
        std::fs::write(&spec_log_options.path_log_file, "previous run\n").expect("seed log");

        let file_log = open_log_file(&spec_log_options).expect("open log");
        let subscriber = tracing_subscriber::registry().with(build_file_layer(file_log));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("next run");
        });

        let l_lines = read_lines(&spec_log_options);
        assert_eq!(l_lines[0], "previous run");
        assert!(l_lines[1].ends_with(" - INFO - next run"));
    }

    #[test]
    fn unopenable_log_path_is_reported() {
        let tmp = TempDir::new().expect("tempdir");
        let spec_log_options = SpecLogOptions {
            path_log_file: tmp.path().join("missing_dir").join("copy_log.txt"),
            ..SpecLogOptions::default()
        };
        let err = open_log_file(&spec_log_options).expect_err("must fail");
        assert!(matches!(err, LogInitError::OpenFailed { .. }));
    }
}
