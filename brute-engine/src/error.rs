//! Error types for the attack engine

use thiserror::Error;

/// Main error type for attack engine operations
#[derive(Debug, Error, Clone, serde::Serialize, serde::Deserialize)]
pub enum AttackError {
    #[error("Invalid attack configuration: {reason}")]
    Configuration { reason: String },

    #[error("Resolved candidate range is empty ({resolved} lines)")]
    EmptyRange { resolved: i64 },

    #[error("Wordlist not found: {path}")]
    WordlistNotFound { path: String },

    #[error("Wordlist unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("Wordlist read failed: {reason}")]
    Io { reason: String },

    #[error("Request attempt failed: {reason}")]
    Attempt { reason: String },
}

impl AttackError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a per-attempt network error
    pub fn attempt(reason: impl Into<String>) -> Self {
        Self::Attempt {
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the whole attack.
    ///
    /// `Attempt` errors are contained within a single candidate's outcome and
    /// are retried; everything else is fatal to the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AttackError::Attempt { .. })
    }
}

impl From<std::io::Error> for AttackError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => AttackError::WordlistNotFound {
                path: error.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => AttackError::SourceUnavailable {
                reason: error.to_string(),
            },
            _ => AttackError::Io {
                reason: error.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for AttackError {
    fn from(error: reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else if error.is_request() {
            format!("request could not be sent: {}", error)
        } else {
            error.to_string()
        };
        AttackError::Attempt { reason }
    }
}

/// Result type for attack engine operations
pub type AttackResult<T> = Result<T, AttackError>;
