//! Error types for CodeAudit

use thiserror::Error;

/// CodeAudit specific error types with detailed variants
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source or result storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Job queue errors
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// AI oracle errors
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Static analysis errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Malformed queue payload or report
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Configuration error details
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
    #[error("Missing configuration key: {0}")]
    Missing(String),
}

/// Storage error details
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Object is not valid UTF-8: {0}")]
    Decode(String),
    #[error("IO operation failed: {0}")]
    Io(String),
}

impl StorageError {
    /// Fetch failures that redelivery cannot fix (missing or undecodable
    /// objects); the work item is failed terminally and acknowledged.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StorageError::NotFound(_) | StorageError::Decode(_))
    }
}

/// Queue error details
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue is closed")]
    Closed,
    #[error("Acknowledge failed: {0}")]
    Ack(String),
    #[error("Publish failed: {0}")]
    Publish(String),
}

/// AI oracle error details
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("API call failed: {0}")]
    RequestFailed(String),
    #[error("Request timeout: {0} seconds")]
    Timeout(u64),
    #[error("Response parse failed: {0}")]
    ResponseParseFailed(String),
    #[error("API response error: {0} - {1}")]
    ApiResponse(u16, String),
    #[error("Oracle not configured: {0}")]
    NotConfigured(String),
}

/// Result type for CodeAudit operations
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_storage_errors() {
        assert!(StorageError::NotFound("a.py".into()).is_permanent());
        assert!(StorageError::Decode("a.py".into()).is_permanent());
        assert!(!StorageError::Io("connection reset".into()).is_permanent());
    }

    #[test]
    fn error_display_includes_detail() {
        let err = AuditError::from(OracleError::ApiResponse(500, "upstream".into()));
        assert!(err.to_string().contains("500"));
    }
}
