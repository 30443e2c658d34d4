#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("no data provided")]
    EmptyRecord,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to create log directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to write log file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read log file: {0}")]
    FileRead(std::io::Error),
}

pub type LogResult<T> = std::result::Result<T, LogError>;
