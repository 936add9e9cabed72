//! Log level filtering
//!
//! `logging.level` picks the most verbose category written to the logs.
//! Access log lines are governed by `logging.access_log` instead.

use std::fmt;
use std::str::FromStr;

/// Severity of a log line, ordered from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Whether a line of severity `line` passes this threshold
    pub fn allows(self, line: Self) -> bool {
        line <= self
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!(
                "Invalid log level '{other}', expected error, warn, info or debug"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("info".parse(), Ok(LogLevel::Info));
        assert_eq!("WARNING".parse(), Ok(LogLevel::Warn));
        assert_eq!(" debug ".parse(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_threshold() {
        assert!(LogLevel::Error.allows(LogLevel::Error));
        assert!(!LogLevel::Error.allows(LogLevel::Warn));
        assert!(LogLevel::Warn.allows(LogLevel::Error));
        assert!(!LogLevel::Warn.allows(LogLevel::Info));
        assert!(LogLevel::Info.allows(LogLevel::Warn));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
        assert!(LogLevel::Debug.allows(LogLevel::Info));
    }
}
