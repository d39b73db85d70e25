//! Logging bootstrap.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Mirror warnings and errors to stderr for command-line use.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration.
//! - A second call with a different level or directory is rejected.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "questdoc";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
}

impl LogSettings {
    /// Parses raw flag values.
    ///
    /// The level accepts any `log` level name in any case, plus `warning`;
    /// `off` is refused since a directory without logs is a misconfiguration.
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level_raw = level.trim();
        let level = match level_raw.to_ascii_lowercase().as_str() {
            "warning" => LevelFilter::Warn,
            other => other
                .parse::<LevelFilter>()
                .map_err(|_| format!("log level `{level_raw}` is not a log level name"))?,
        };
        if level == LevelFilter::Off {
            return Err("log level `off` disables logging; omit --log-dir instead".to_string());
        }

        let dir_raw = log_dir.trim();
        if dir_raw.is_empty() {
            return Err("no log directory given".to_string());
        }
        let log_dir = PathBuf::from(dir_raw);
        if log_dir.is_relative() {
            return Err(format!("log directory `{dir_raw}` is relative"));
        }

        Ok(Self { level, log_dir })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Initializes file logging at `level` under the absolute `log_dir`.
///
/// # Errors
/// - `level` is not a `log` level name, or is `off`.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let settings = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start_logger(settings.clone()))?;
    if active.settings != settings {
        return Err(format!(
            "logger running with level={} dir={}; cannot restart with level={} dir={}",
            active.settings.level,
            active.settings.log_dir.display(),
            settings.level,
            settings.log_dir.display()
        ));
    }
    Ok(())
}

/// Returns the settings of the active logger, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, String> {
    let log_dir = &settings.log_dir;
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("cannot create {}: {err}", log_dir.display()))?;

    let spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger did not start: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        settings.level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

/// Flattens line breaks and caps the length of a log value.
fn one_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut capped: String = flattened.chars().take(max_chars).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line, LogSettings};
    use log::LevelFilter;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const ABS_DIR: &str = "/var/log/questdoc";

    #[test]
    fn level_names_parse_in_any_case() {
        let settings = LogSettings::parse(" INFO ", ABS_DIR).unwrap();
        assert_eq!(settings.level, LevelFilter::Info);
        assert_eq!(settings.log_dir, PathBuf::from(ABS_DIR));
        assert_eq!(
            LogSettings::parse("warning", ABS_DIR).unwrap().level,
            LevelFilter::Warn
        );
        assert_eq!(
            LogSettings::parse("Trace", ABS_DIR).unwrap().level,
            LevelFilter::Trace
        );
    }

    #[test]
    fn unknown_and_off_levels_are_refused() {
        assert!(LogSettings::parse("loud", ABS_DIR)
            .unwrap_err()
            .contains("`loud`"));
        assert!(LogSettings::parse("off", ABS_DIR)
            .unwrap_err()
            .contains("omit --log-dir"));
    }

    #[test]
    fn relative_and_blank_dirs_are_refused() {
        assert!(LogSettings::parse("info", "logs")
            .unwrap_err()
            .contains("relative"));
        assert!(LogSettings::parse("info", "  ")
            .unwrap_err()
            .contains("no log directory"));
    }

    #[test]
    fn one_line_flattens_and_caps() {
        assert_eq!(one_line("a\nb", 10), "a b");
        assert_eq!(one_line("abcdefgh", 3), "abc...");
    }

    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "questdoc-logging-{suffix}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = unique_temp_dir("same");
        let other = unique_temp_dir("other");
        let dir_str = dir.to_str().expect("temp dir should be valid UTF-8");
        let other_str = other.to_str().expect("temp dir should be valid UTF-8");

        init_logging("info", dir_str).unwrap();
        init_logging("INFO", dir_str).unwrap();
        assert!(init_logging("debug", dir_str)
            .unwrap_err()
            .contains("cannot restart"));
        assert!(init_logging("info", other_str)
            .unwrap_err()
            .contains("cannot restart"));

        let status = logging_status().unwrap();
        assert_eq!(status.level, LevelFilter::Info);
        assert_eq!(status.log_dir, dir);
    }
}
