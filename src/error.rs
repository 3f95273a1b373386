// Error types for herolist.
// Separates transport failures, server rejections and local cache failures.

use thiserror::Error;

/// Transport-level failure classes, used to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout,
    Connect,
    Other,
}

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("Network error ({kind:?}): {message}")]
    Network {
        kind: NetworkFailure,
        message: String,
    },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl PagerError {
    pub fn timeout(message: impl Into<String>) -> Self {
        PagerError::Network {
            kind: NetworkFailure::Timeout,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        PagerError::Network {
            kind: NetworkFailure::Connect,
            message: message.into(),
        }
    }

    /// Wrap any failure raised while committing to the local store.
    pub fn cache(err: impl std::fmt::Display) -> Self {
        PagerError::Cache(err.to_string())
    }

    /// The network failure class, if this is a transport error.
    pub fn network_failure(&self) -> Option<NetworkFailure> {
        match self {
            PagerError::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PagerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PagerError::timeout(err.to_string())
        } else if err.is_connect() {
            PagerError::connect(err.to_string())
        } else if err.is_decode() || err.is_status() {
            PagerError::Server(err.to_string())
        } else {
            PagerError::Network {
                kind: NetworkFailure::Other,
                message: err.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_kind() {
        assert_eq!(
            PagerError::timeout("read timed out").network_failure(),
            Some(NetworkFailure::Timeout)
        );
        assert_eq!(
            PagerError::connect("refused").network_failure(),
            Some(NetworkFailure::Connect)
        );
        assert_eq!(PagerError::Server("500".into()).network_failure(), None);
    }

    #[test]
    fn test_cache_wraps_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PagerError::cache(&io);
        assert!(matches!(err, PagerError::Cache(ref msg) if msg.contains("denied")));
    }
}
