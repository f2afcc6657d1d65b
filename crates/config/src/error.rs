//! Configuration error types

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating a reformer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - required field missing
    #[error("reformer is missing required field '{field}'")]
    MissingField {
        /// Missing field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("reformer has invalid {field}: {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Validation error - options that only make sense together
    #[error("`{field}` requires `{requires}` to be enabled")]
    RequiresOption {
        /// The field that was set
        field: &'static str,
        /// The option it depends on
        requires: &'static str,
    },
}

impl ConfigError {
    /// Create a MissingField error
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::missing_field("tag");
        assert!(err.to_string().contains("tag"));
        assert!(err.to_string().contains("missing required field"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("keep_keys", "must not be empty");
        assert!(err.to_string().contains("keep_keys"));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_requires_option_error() {
        let err = ConfigError::RequiresOption {
            field: "keep_keys",
            requires: "renew_record",
        };
        assert!(err.to_string().contains("keep_keys"));
        assert!(err.to_string().contains("renew_record"));
    }
}
