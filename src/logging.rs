//! Logging for cmdln tools
//!
//! A small `log` backend writing one line per record, as text or JSON, to
//! stderr or to a file. The framework itself only logs through the `log`
//! facade (`debug!` for lifecycle transitions, `trace!` for parse details);
//! a tool opts in by calling [`init_logger`], typically from its init hook.
//!
//! ```no_run
//! use cmdln::logging::{init_logger, LogConfig, LogFormat};
//! use log::LevelFilter;
//!
//! init_logger(LogConfig {
//!     level: LevelFilter::Debug,
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{Level, LevelFilter};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogDestination {
    #[default]
    Stderr,
    File(PathBuf),
}

/// JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            format: LogFormat::Text,
            destination: LogDestination::Stderr,
        }
    }
}

impl LogConfig {
    /// Parse a `LEVEL[,FORMAT]` setting such as `debug` or `trace,json`
    pub fn from_setting(setting: &str) -> Result<Self> {
        let mut parts = setting.split(',').map(str::trim);
        let level = parse_log_level(parts.next().unwrap_or_default())?;
        let format = match parts.next() {
            Some(format) => format.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
            None => LogFormat::Text,
        };
        Ok(Self {
            level,
            format,
            ..Self::default()
        })
    }
}

enum Sink {
    Stderr,
    File(Mutex<File>),
}

/// `log` backend for cmdln tools
pub struct CmdlnLogger {
    level: LevelFilter,
    format: LogFormat,
    sink: Sink,
}

impl CmdlnLogger {
    pub fn new(config: &LogConfig) -> Result<Self> {
        let sink = match &config.destination {
            LogDestination::Stderr => Sink::Stderr,
            LogDestination::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                Sink::File(Mutex::new(file))
            }
        };
        Ok(Self {
            level: config.level,
            format: config.format,
            sink,
        })
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_text(level: Level, target: &str, message: &str) -> String {
        format!(
            "{} [{}] {}: {}",
            Self::format_timestamp(),
            level.to_string().to_uppercase(),
            target,
            message
        )
    }

    fn format_json(level: Level, target: &str, message: &str) -> Result<String> {
        let entry = JsonLogEntry {
            timestamp: Self::format_timestamp(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message: message.to_string(),
        };
        serde_json::to_string(&entry).context("Failed to serialize log entry to JSON")
    }

    fn format_record(&self, record: &log::Record) -> String {
        let message = record.args().to_string();
        match self.format {
            LogFormat::Text => Self::format_text(record.level(), record.target(), &message),
            LogFormat::Json => Self::format_json(record.level(), record.target(), &message)
                .unwrap_or_else(|_| Self::format_text(record.level(), record.target(), &message)),
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.sink {
            Sink::Stderr => writeln!(io::stderr(), "{}", line),
            Sink::File(file) => writeln!(file.lock(), "{}", line),
        }
    }
}

impl log::Log for CmdlnLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_record(record);
        if let Err(e) = self.write_line(&line) {
            eprintln!("Logging error: {}", e);
        }
    }

    fn flush(&self) {
        let _ = match &self.sink {
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.lock().flush(),
        };
    }
}

/// Install [`CmdlnLogger`] as the global logger
pub fn init_logger(config: LogConfig) -> Result<()> {
    let logger = CmdlnLogger::new(&config)?;
    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(config.level);
    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use tempfile::TempDir;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error").unwrap(), LevelFilter::Error);
        assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_config_from_setting() {
        let config = LogConfig::from_setting("trace,json").unwrap();
        assert_eq!(config.level, LevelFilter::Trace);
        assert_eq!(config.format, LogFormat::Json);

        let config = LogConfig::from_setting("info").unwrap();
        assert_eq!(config.format, LogFormat::Text);

        assert!(LogConfig::from_setting("info,xml").is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let timestamp = CmdlnLogger::format_timestamp();
        assert_eq!(timestamp.len(), 19);
        assert_eq!(timestamp.chars().nth(4), Some('-'));
        assert_eq!(timestamp.chars().nth(10), Some(' '));
        assert_eq!(timestamp.chars().nth(13), Some(':'));
    }

    #[test]
    fn test_text_and_json_lines() {
        let text = CmdlnLogger::format_text(Level::Debug, "cmdln::cli", "dispatching");
        assert!(text.contains("[DEBUG] cmdln::cli: dispatching"));

        let json = CmdlnLogger::format_json(Level::Info, "cmdln::cli", "built").unwrap();
        let entry: JsonLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.target, "cmdln::cli");
        assert_eq!(entry.message, "built");
    }

    #[test]
    fn test_init_logger_installs_once() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            level: LevelFilter::Debug,
            format: LogFormat::Text,
            destination: LogDestination::File(dir.path().join("cmdln.log")),
        };
        init_logger(config.clone()).unwrap();
        assert_eq!(log::max_level(), LevelFilter::Debug);

        let err = init_logger(config).unwrap_err();
        assert!(err.to_string().contains("Failed to set global logger"));
    }

    #[test]
    fn test_file_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cmdln.log");
        let logger = CmdlnLogger::new(&LogConfig {
            level: LevelFilter::Info,
            format: LogFormat::Text,
            destination: LogDestination::File(path.clone()),
        })
        .unwrap();

        logger.log(
            &log::Record::builder()
                .level(Level::Info)
                .target("conan")
                .args(format_args!("ran init"))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(Level::Debug)
                .target("conan")
                .args(format_args!("filtered"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[INFO] conan: ran init"));
        assert!(!contents.contains("filtered"));
    }
}
