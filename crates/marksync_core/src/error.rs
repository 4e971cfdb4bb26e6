//! Error types for marksync core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core artifact operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The local artifact does not exist.
    #[error("local artifact not found: {path}")]
    ArtifactNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A present watermark field could not be parsed.
    ///
    /// The sync history of this artifact is unreliable; the caller must be
    /// told rather than having the field silently defaulted.
    #[error("malformed watermark field `{field}`: {message}")]
    MalformedWatermark {
        /// The watermark key that failed to parse.
        field: String,
        /// Description of the parse failure.
        message: String,
    },

    /// A single checklist line could not be parsed as a task.
    #[error("unparseable task on line {line}: {message}")]
    TaskParse {
        /// 1-based line number within the artifact body.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::MalformedWatermark {
            field: "gdoc_last_sync".into(),
            message: "not an RFC 3339 timestamp".into(),
        };
        assert!(err.to_string().contains("gdoc_last_sync"));

        let err = CoreError::TaskParse {
            line: 7,
            message: "unknown status marker".into(),
        };
        assert!(err.to_string().contains("line 7"));
    }
}
