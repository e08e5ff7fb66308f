//! Unified error type for Estate Guard operations
//!
//! Records describe failures of the host application. This type describes
//! failures of the pipeline itself: bad configuration, unusable input,
//! platform calls that could not be made.

use serde::{Deserialize, Serialize};

/// Unified error type for all Estate Guard operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EstateError {
    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// A platform capability call failed or is unsupported
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl EstateError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a platform error
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for EstateError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for EstateError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

/// Standard result type for Estate Guard operations
pub type EstateResult<T> = Result<T, EstateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            EstateError::config("max_retries must be at least 1").to_string(),
            "Configuration error: max_retries must be at least 1"
        );
        assert_eq!(
            EstateError::platform("no wallet provider").to_string(),
            "Platform error: no wallet provider"
        );
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: EstateError = serde_json::from_str::<u32>("not a number")
            .map_err(EstateError::from)
            .unwrap_err();
        assert!(matches!(err, EstateError::Serialization { .. }));
    }
}
