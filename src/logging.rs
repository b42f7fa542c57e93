// Level-gated stderr logging. Protocol messages own stdout; everything
// diagnostic goes to stderr with a fixed prefix.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Information,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "information" | "info" => Ok(LogLevel::Information),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Install the process-wide log level. Later calls are ignored.
pub fn init(level: LogLevel) {
    let _ = LEVEL.set(level);
}

fn enabled(level: LogLevel) -> bool {
    level >= *LEVEL.get_or_init(|| LogLevel::Information)
}

pub fn debug(message: &str) {
    if enabled(LogLevel::Debug) {
        eprintln!("sharplens: {message}");
    }
}

pub fn info(message: &str) {
    if enabled(LogLevel::Information) {
        eprintln!("sharplens: {message}");
    }
}

pub fn warn(message: &str) {
    if enabled(LogLevel::Warning) {
        eprintln!("sharplens: Warning: {message}");
    }
}

pub fn error(message: &str) {
    if enabled(LogLevel::Error) {
        eprintln!("sharplens: Error: {message}");
    }
}
