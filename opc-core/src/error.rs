//! Errors raised while shaping configuration and API data

use thiserror::Error;

/// Failure while decoding identifiers or converting between the
/// configuration shape and the remote API shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required field is missing or a business rule is violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value expected to be numeric or structured is malformed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
