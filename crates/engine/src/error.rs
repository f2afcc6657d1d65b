//! Reform error types
//!
//! Errors that can occur while building a reformer. Per-event expansion
//! failures are contained at the engine boundary and logged instead of
//! propagating, so the variants here are configuration-time only.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors that can occur when constructing a reformer
#[derive(Debug, Error)]
pub enum ReformError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A template string failed to compile
    #[error("failed to compile template `{template}`: {message}")]
    Compile {
        /// The offending template source
        template: String,
        /// Why compilation failed
        message: String,
    },

    /// I/O error (e.g., resolving the hostname)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReformError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a compile error
    pub fn compile(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compile {
            template: template.into(),
            message: message.into(),
        }
    }
}
