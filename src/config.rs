// Configuration read from environment variables with defaults.

use crate::logging::LogLevel;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Solution file (or directory containing one) to load at startup
    /// (SOLUTION_PATH).
    pub solution_path: Option<PathBuf>,

    /// Minimum level for stderr logging (LOG_LEVEL).
    pub log_level: LogLevel,

    /// Document cache toggle; the literal string "false" disables it
    /// (ENABLE_SEMANTIC_CACHE).
    pub semantic_cache_enabled: bool,

    /// Result cap for diagnostics listings (MAX_DIAGNOSTICS).
    pub max_diagnostics: usize,

    /// Per-operation bound for solution-wide scans in seconds
    /// (TIMEOUT_SECONDS).
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solution_path: None,
            log_level: LogLevel::Information,
            semantic_cache_enabled: true,
            max_diagnostics: 100,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("SOLUTION_PATH") {
            if !val.trim().is_empty() {
                config.solution_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = env::var("LOG_LEVEL") {
            match val.parse() {
                Ok(level) => config.log_level = level,
                Err(_) => eprintln!(
                    "sharplens: Warning: Invalid LOG_LEVEL value: {}, using default: {}",
                    val, config.log_level
                ),
            }
        }

        if let Ok(val) = env::var("ENABLE_SEMANTIC_CACHE") {
            config.semantic_cache_enabled = val != "false";
        }

        if let Ok(val) = env::var("MAX_DIAGNOSTICS") {
            if let Ok(parsed) = val.parse() {
                config.max_diagnostics = parsed;
            } else {
                eprintln!(
                    "sharplens: Warning: Invalid MAX_DIAGNOSTICS value: {}, using default: {}",
                    val, config.max_diagnostics
                );
            }
        }

        if let Ok(val) = env::var("TIMEOUT_SECONDS") {
            if let Ok(parsed) = val.parse() {
                config.timeout_seconds = parsed;
            } else {
                eprintln!(
                    "sharplens: Warning: Invalid TIMEOUT_SECONDS value: {}, using default: {}",
                    val, config.timeout_seconds
                );
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.solution_path.is_none());
        assert_eq!(config.log_level, LogLevel::Information);
        assert!(config.semantic_cache_enabled);
        assert_eq!(config.max_diagnostics, 100);
        assert_eq!(config.timeout_seconds, 30);
    }
}
