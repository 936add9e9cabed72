//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr, filtered by the
//! configured level.

use super::level::LogLevel;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

/// Thread-safe log writer
pub struct LogWriter {
    level: LogLevel,
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(
        level: LogLevel,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<Self> {
        Ok(Self {
            level,
            access: open_target(access_log_file, LogTarget::Stdout)?,
            error: open_target(error_log_file, LogTarget::Stderr)?,
        })
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        write_to_target(&self.access, message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        write_to_target(&self.error, message);
    }

    /// Write warning (to error log target) unless filtered out
    pub fn write_warning(&self, message: &str) {
        if self.level.allows(LogLevel::Warn) {
            write_to_target(&self.error, message);
        }
    }

    /// Write info message (to access log target) unless filtered out
    pub fn write_info(&self, message: &str) {
        if self.level.allows(LogLevel::Info) {
            write_to_target(&self.access, message);
        }
    }

    /// Write debug message (to access log target) unless filtered out
    pub fn write_debug(&self, message: &str) {
        if self.level.allows(LogLevel::Debug) {
            write_to_target(&self.access, message);
        }
    }
}

fn open_target(path: Option<&str>, fallback: LogTarget) -> io::Result<LogTarget> {
    match path {
        Some(p) => Ok(LogTarget::File(Mutex::new(open_log_file(p)?))),
        None => Ok(fallback),
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => println!("{message}"),
        LogTarget::Stderr => eprintln!("{message}"),
        LogTarget::File(file) => {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(
    level: LogLevel,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(level, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, `None` before `init()`
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("access.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(LogLevel::Info, Some(path_str), None).unwrap();
        writer.write_access("first");
        writer.write_info("second");
        writer.write_debug("hidden");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_level_filters_lines() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        let error = dir.path().join("error.log");

        let writer = LogWriter::new(LogLevel::Error, access.to_str(), error.to_str()).unwrap();
        writer.write_access("request line");
        writer.write_info("started");
        writer.write_warning("careful");
        writer.write_error("broken");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "request line\n");
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "broken\n");
    }

    #[test]
    fn test_debug_level_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        let error = dir.path().join("error.log");

        let writer = LogWriter::new(LogLevel::Debug, access.to_str(), error.to_str()).unwrap();
        writer.write_debug("detail");
        writer.write_info("started");
        writer.write_warning("careful");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "detail\nstarted\n");
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "careful\n");
    }
}
