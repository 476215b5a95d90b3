//! Error types for memoneo-core

use serde_json::Value;
use thiserror::Error;

/// Caller misuse detected before any work is scheduled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("Value shape does not match topic type {0}")]
    ValueTypeMismatch(String),

    #[error("Parent references must share one form to compare ({left} vs {right})")]
    MixedParentForms { left: String, right: String },
}

/// Errors from the platform secure store or local files
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Secure storage read failed: {0}")]
    ReadFailed(String),

    #[error("Secure storage write failed: {0}")]
    WriteFailed(String),

    #[error("File operation failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// A failed call at the HTTP boundary.
///
/// Carries whatever the boundary learned: the status code and decoded error
/// body when the server answered, or only a transport message when it did not.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.human_message())]
pub struct HttpError {
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub transport: Option<String>,
}

impl HttpError {
    /// The server answered with a non-success status
    pub fn status(status: u16, body: Option<Value>) -> Self {
        Self {
            status: Some(status),
            body,
            transport: None,
        }
    }

    /// The request never produced a response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            transport: Some(message.into()),
        }
    }

    /// Human-readable message, preferring what the server said.
    ///
    /// Order: `error` body field, `message` body field, status line,
    /// transport message.
    pub fn human_message(&self) -> String {
        let from_body = |field: &str| {
            self.body
                .as_ref()
                .and_then(|body| body.get(field))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(message) = from_body("error").or_else(|| from_body("message")) {
            return message;
        }
        if let Some(status) = self.status {
            return format!("Request failed with status code {}", status);
        }
        self.transport
            .clone()
            .unwrap_or_else(|| "Unknown network error".to_string())
    }
}

/// Result type for validation checks
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField("name");
        assert!(format!("{}", err).contains("Missing required field"));
        assert!(format!("{}", err).contains("name"));

        let err = ValidationError::OutOfRange {
            field: "rating",
            value: 7,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("rating"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(ref m) if m.contains("gone")));
    }

    #[test]
    fn test_http_error_prefers_error_field() {
        let err = HttpError::status(
            400,
            Some(json!({ "error": "Mail already taken", "message": "ignored" })),
        );
        assert_eq!(err.human_message(), "Mail already taken");
        assert_eq!(err.to_string(), "Mail already taken");
    }

    #[test]
    fn test_http_error_falls_back_to_message_field() {
        let err = HttpError::status(422, Some(json!({ "message": "Invalid rank" })));
        assert_eq!(err.human_message(), "Invalid rank");
    }

    #[test]
    fn test_http_error_falls_back_to_status() {
        let err = HttpError::status(500, Some(json!({ "error": "" })));
        assert_eq!(err.human_message(), "Request failed with status code 500");
    }

    #[test]
    fn test_http_error_transport_message() {
        let err = HttpError::transport("connection refused");
        assert_eq!(err.human_message(), "connection refused");
    }
}
