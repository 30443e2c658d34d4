//! Append-only log store.
//!
//! The [`LogStore`] owns one text file. Records are appended one per line; the file is
//! only ever read, downloaded or truncated as a whole.
//!
//! The file has two observable states:
//!
//! ```text
//! Absent  --append--> Present(record\n)
//! Present --append--> Present(content + record\n)
//! Present --clear-->  Present("")
//! Absent  --clear-->  Absent            (reported as LogClear::NothingToDelete)
//! ```

use crate::{LogError, LogResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single log record that is known to contain non-whitespace text.
///
/// Unlike a trimmed text type, the original text is kept as given: only the emptiness check
/// looks at the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord(String);

impl LogRecord {
    /// Validates `text` as a log record.
    ///
    /// # Errors
    ///
    /// Returns `LogError::EmptyRecord` if `text` is empty or whitespace only.
    pub fn new(text: impl Into<String>) -> LogResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(LogError::EmptyRecord);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of reading the whole log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogContent {
    /// No log file has been written yet
    Absent,
    Present(Vec<u8>),
}

/// Outcome of clearing the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogClear {
    Cleared,
    NothingToDelete,
}

/// Service owning the log file.
///
/// `append` and `clear` hold an internal lock so a clear never interleaves with a partially
/// appended record from this process.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` followed by a newline, creating the file if needed.
    pub fn append(&self, record: &LogRecord) -> LogResult<()> {
        let _guard = self.guard();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    tracing::error!("failed to create log directory {}: {}", parent.display(), e);
                    LogError::DirCreation(e)
                })?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_failed("open", e))?;

        let mut line = String::with_capacity(record.as_str().len() + 1);
        line.push_str(record.as_str());
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| self.write_failed("append to", e))?;

        Ok(())
    }

    /// Returns the entire log, or [`LogContent::Absent`] if nothing was ever written.
    pub fn read_all(&self) -> LogResult<LogContent> {
        let _guard = self.guard();

        match fs::read(&self.path) {
            Ok(bytes) => Ok(LogContent::Present(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogContent::Absent),
            Err(e) => {
                tracing::error!("failed to read log {}: {}", self.path.display(), e);
                Err(LogError::FileRead(e))
            }
        }
    }

    /// Truncates the log to empty. An absent log stays absent.
    pub fn clear(&self) -> LogResult<LogClear> {
        let _guard = self.guard();

        match fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            Ok(_) => {
                tracing::debug!("truncated log {}", self.path.display());
                Ok(LogClear::Cleared)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogClear::NothingToDelete),
            Err(e) => Err(self.write_failed("truncate", e)),
        }
    }

    fn write_failed(&self, action: &str, e: std::io::Error) -> LogError {
        tracing::error!("failed to {} log {}: {}", action, self.path.display(), e);
        LogError::FileWrite(e)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The lock protects no data, so a poisoned guard is still usable.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
