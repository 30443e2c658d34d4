//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the stores. Request handlers never read environment variables, which keeps
//! tests free to point each store at its own temporary directory.

use crate::constants::{DEFAULT_BODY_LIMIT, DEFAULT_LOG_FILE, DEFAULT_PORT, DEFAULT_UPLOAD_DIR};
use crate::{LogError, LogResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    upload_dir: PathBuf,
    log_file: PathBuf,
    body_limit: usize,
    port: u16,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        upload_dir: PathBuf,
        log_file: PathBuf,
        body_limit: usize,
        port: u16,
    ) -> LogResult<Self> {
        if upload_dir.as_os_str().is_empty() {
            return Err(LogError::InvalidConfig(
                "upload directory cannot be empty".into(),
            ));
        }

        if log_file.as_os_str().is_empty() {
            return Err(LogError::InvalidConfig("log file cannot be empty".into()));
        }

        if body_limit == 0 {
            return Err(LogError::InvalidConfig(
                "body limit must be greater than zero".into(),
            ));
        }

        Ok(Self {
            upload_dir,
            log_file,
            body_limit,
            port,
        })
    }

    /// Build a configuration from optional raw values, applying defaults.
    ///
    /// Values are the unparsed strings read from the environment; `None` or a blank value
    /// selects the default.
    pub fn from_env_values(
        upload_dir: Option<String>,
        log_file: Option<String>,
        body_limit: Option<String>,
        port: Option<String>,
    ) -> LogResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let upload_dir = non_blank(upload_dir).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into());
        let log_file = non_blank(log_file).unwrap_or_else(|| DEFAULT_LOG_FILE.into());

        let body_limit = non_blank(body_limit)
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|e| LogError::InvalidConfig(format!("invalid body limit {v:?}: {e}")))
            })
            .transpose()?
            .unwrap_or(DEFAULT_BODY_LIMIT);

        let port = non_blank(port)
            .map(|v| {
                v.parse::<u16>()
                    .map_err(|e| LogError::InvalidConfig(format!("invalid port {v:?}: {e}")))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        Self::new(upload_dir.into(), log_file.into(), body_limit, port)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let cfg = CoreConfig::from_env_values(None, None, None, None).unwrap();

        assert_eq!(cfg.upload_dir(), Path::new(DEFAULT_UPLOAD_DIR));
        assert_eq!(cfg.log_file(), Path::new(DEFAULT_LOG_FILE));
        assert_eq!(cfg.body_limit(), DEFAULT_BODY_LIMIT);
        assert_eq!(cfg.port(), 3000);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = CoreConfig::from_env_values(
            Some("  ".into()),
            Some(String::new()),
            Some(" ".into()),
            Some(String::new()),
        )
        .unwrap();

        assert_eq!(cfg.upload_dir(), Path::new(DEFAULT_UPLOAD_DIR));
        assert_eq!(cfg.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_explicit_values() {
        let cfg = CoreConfig::from_env_values(
            Some("/srv/photos".into()),
            Some("/var/log/snaplog.txt".into()),
            Some("1024".into()),
            Some("8080".into()),
        )
        .unwrap();

        assert_eq!(cfg.upload_dir(), Path::new("/srv/photos"));
        assert_eq!(cfg.log_file(), Path::new("/var/log/snaplog.txt"));
        assert_eq!(cfg.body_limit(), 1024);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = CoreConfig::from_env_values(None, None, None, Some("http".into()));
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));

        let result = CoreConfig::from_env_values(None, None, None, Some("70000".into()));
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let result = CoreConfig::from_env_values(None, None, Some("0".into()), None);
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_paths_rejected() {
        let result = CoreConfig::new(PathBuf::new(), "logs.txt".into(), 1, 3000);
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));

        let result = CoreConfig::new("uploads".into(), PathBuf::new(), 1, 3000);
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));
    }
}
