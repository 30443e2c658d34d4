//! Constants used throughout the snaplog core crate.
//!
//! Defaults applied when the corresponding environment variable is unset.

/// Default directory for uploaded photos.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default path of the append-only log file.
pub const DEFAULT_LOG_FILE: &str = "logs.txt";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default cap on request body size, in bytes (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;
