//! Error types for remote collaborators.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors surfaced by remote collaborators.
///
/// All variants except [`RemoteError::AssetFetch`] abort the invocation:
/// the engine never retries internally and leaves retry policy to the
/// caller.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote document or collection does not exist.
    #[error("remote not found: {reference}")]
    NotFound {
        /// The reference that failed to resolve.
        reference: String,
    },

    /// Credentials are missing, expired, or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The credential is valid but lacks access to the target.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The remote service is rate limiting requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network or transport failure.
    #[error("network error: {message}")]
    Network {
        /// Error message.
        message: String,
        /// Whether the caller may reasonably retry the whole invocation.
        retryable: bool,
    },

    /// One embedded asset failed to fetch. Non-fatal: recorded in the
    /// report while the pass continues.
    #[error("asset fetch failed for `{name}`: {message}")]
    AssetFetch {
        /// Asset name.
        name: String,
        /// Error message.
        message: String,
    },
}

impl RemoteError {
    /// Creates a retryable network error.
    pub fn network_retryable(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable network error.
    pub fn network_fatal(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if the whole invocation must stop on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RemoteError::AssetFetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_fetch_is_the_only_non_fatal() {
        assert!(RemoteError::NotFound { reference: "x".into() }.is_fatal());
        assert!(RemoteError::Auth("expired".into()).is_fatal());
        assert!(RemoteError::RateLimited("quota".into()).is_fatal());
        assert!(RemoteError::network_retryable("reset").is_fatal());
        assert!(!RemoteError::AssetFetch {
            name: "image-1.png".into(),
            message: "403".into()
        }
        .is_fatal());
    }
}
