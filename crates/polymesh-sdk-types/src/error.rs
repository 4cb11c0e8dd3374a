//! Errors raised while parsing or validating domain primitives.

use thiserror::Error;

/// A specialized Result type for primitive parsing.
pub type TypeResult<T> = Result<T, TypeError>;

/// Errors produced when a primitive value fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The ticker is empty, too long or contains forbidden characters.
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// A 32-byte identifier could not be decoded.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// A transaction tag is not of the form `module.call`.
    #[error("Invalid transaction tag: {0}")]
    InvalidTxTag(String),

    /// An amount could not be parsed or is out of range.
    #[error("Invalid balance: {0}")]
    InvalidBalance(String),
}

impl From<hex::FromHexError> for TypeError {
    fn from(err: hex::FromHexError) -> Self {
        Self::InvalidId(err.to_string())
    }
}
