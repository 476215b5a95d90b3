//! Error types for memoneo-logging

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rolling appender error: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber was installed earlier
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

pub type LogResult<T> = Result<T, LogError>;
