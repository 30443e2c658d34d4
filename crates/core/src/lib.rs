//! # snaplog Core
//!
//! Core configuration and the append-only log store for the snaplog service.
//!
//! This crate contains pure filesystem operations:
//! - Startup configuration resolved once and passed into services
//! - The single log file: append, read, clear
//!
//! **No API concerns**: HTTP routing and request body handling belong in `api-rest`.
//! Photo storage lives in `snaplog_files`.

pub mod config;
pub mod constants;
pub mod error;
pub mod logs;

pub use config::CoreConfig;
pub use constants::{DEFAULT_BODY_LIMIT, DEFAULT_LOG_FILE, DEFAULT_PORT, DEFAULT_UPLOAD_DIR};
pub use error::{LogError, LogResult};
pub use logs::{LogClear, LogContent, LogRecord, LogStore};
