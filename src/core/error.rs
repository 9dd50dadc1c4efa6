//! Error types for nlog

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Queued writer no longer accepts lines
    #[error("Writer already stopped")]
    WriterStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// One or more children of a multi-writer failed
    #[error("{count} writer(s) failed: {summary}")]
    WriteFailures { count: usize, summary: String },

    /// TOML configuration parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Custom marshal function failure
    #[error("marshaling error: {0}")]
    MarshalError(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Merge per-writer failures into one composite error.
    ///
    /// Failures are listed in the order they occurred, so the first one
    /// reported is the first child that failed. Returns `None` when the list
    /// is empty.
    pub fn write_failures(failures: Vec<(usize, LoggerError)>) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        let summary = failures
            .iter()
            .map(|(idx, err)| format!("writer #{}: {}", idx, err))
            .collect::<Vec<_>>()
            .join("; ");
        Some(LoggerError::WriteFailures {
            count: failures.len(),
            summary,
        })
    }

    /// Create a marshal error
    pub fn marshal<S: Into<String>>(msg: S) -> Self {
        LoggerError::MarshalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("loader", "missing formatters");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert!(matches!(err, LoggerError::FileRotationError { .. }));

        let err = LoggerError::marshal("cycle detected");
        assert!(matches!(err, LoggerError::MarshalError(_)));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        assert_eq!(LoggerError::WriterStopped.to_string(), "Writer already stopped");
        assert_eq!(
            LoggerError::marshal("bad value").to_string(),
            "marshaling error: bad value"
        );
    }

    #[test]
    fn test_write_failures_keeps_order() {
        assert!(LoggerError::write_failures(Vec::new()).is_none());

        let err = LoggerError::write_failures(vec![
            (0, LoggerError::writer("disk full")),
            (2, LoggerError::WriterStopped),
        ])
        .unwrap();

        match &err {
            LoggerError::WriteFailures { count, summary } => {
                assert_eq!(*count, 2);
                assert!(summary.starts_with("writer #0: Writer error: disk full"));
                assert!(summary.ends_with("writer #2: Writer already stopped"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log line", "cannot write to sink", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log line"));
        assert!(err.to_string().contains("cannot write to sink"));
    }
}
