//! Error types for the Polymesh SDK.
//!
//! [`PolymeshError`] covers every failure surfaced to callers:
//!
//! - validation errors raised while a Procedure is prepared, before anything
//!   reaches the chain;
//! - transaction outcomes ([`TransactionError`]) raised when a queue stops on a
//!   critical failure;
//! - status machine violations and collaborator (query/submission) failures.

use crate::authorization::AuthorizationStatus;
use crate::transaction::{TransactionError, TransactionStatus};
use polymesh_sdk_types::{Balance, TypeError};
use thiserror::Error;

/// A specialized Result type for Polymesh SDK operations.
pub type PolymeshResult<T> = Result<T, PolymeshError>;

/// The main error type for the Polymesh SDK.
#[derive(Error, Debug)]
pub enum PolymeshError {
    /// The operation would not change anything on chain
    #[error("No data change: {0}")]
    NoDataChange(String),

    /// The paying account cannot cover an amount
    #[error("Insufficient balance: {message} (required {required}, available {available})")]
    InsufficientBalance {
        /// What the balance was needed for
        message: String,
        /// The amount needed
        required: Balance,
        /// The amount available
        available: Balance,
    },

    /// The signer lacks permissions or roles
    #[error("Unmet authorizations: {0}")]
    UnmetAuthorizations(Box<AuthorizationStatus>),

    /// A referenced entity does not exist on chain
    #[error("Entity does not exist: {0}")]
    EntityDoesNotExist(String),

    /// An argument is invalid for the current chain state
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A transaction settled with a non-success status
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A status update was attempted on a settled transaction
    #[error("Transaction already resolved with status {status}")]
    AlreadyResolved {
        /// The terminal status the transaction settled with
        status: TransactionStatus,
    },

    /// A status update would not move the state machine forward
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status
        from: TransactionStatus,
        /// The requested status
        to: TransactionStatus,
    },

    /// A read-only chain or middleware query failed
    #[error("Query failed: {0}")]
    Query(String),

    /// The submission primitive failed before producing any event
    #[error("Submission failed: {0}")]
    Submission(String),

    /// A procedure result depends on a transaction that did not succeed
    #[error("Unresolved result: {0}")]
    UnresolvedResult(String),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A primitive value failed validation
    #[error(transparent)]
    Types(#[from] TypeError),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal SDK error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &["secret", "seed", "mnemonic", "private_key", "password"];

impl PolymeshError {
    /// Creates a new no-data-change error
    pub fn no_data_change<S: Into<String>>(msg: S) -> Self {
        Self::NoDataChange(msg.into())
    }

    /// Creates a new invalid-argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new entity-does-not-exist error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::EntityDoesNotExist(msg.into())
    }

    /// Creates a new query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    /// Returns true for errors raised while preparing a Procedure. These never
    /// touch chain state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoDataChange(_)
                | Self::InsufficientBalance { .. }
                | Self::UnmetAuthorizations(_)
                | Self::EntityDoesNotExist(_)
                | Self::InvalidArgument(_)
                | Self::Types(_)
        )
    }

    /// Returns true if a caller may reasonably retry with a freshly prepared
    /// queue. Nothing in this crate retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transaction(err) => err.status() == TransactionStatus::Aborted,
            Self::Query(_) | Self::Submission(_) => true,
            _ => false,
        }
    }

    /// Returns the terminal status of the failed transaction, if this error
    /// came from one.
    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        match self {
            Self::Transaction(err) => Some(err.status()),
            _ => None,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are stripped, long messages truncated and messages
    /// that look like they carry key material are redacted.
    pub fn sanitized_message(&self) -> String {
        sanitize_string(&self.to_string())
    }

    /// Returns a short message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoDataChange(_) => "Nothing to change",
            Self::InsufficientBalance { .. } => "Insufficient balance",
            Self::UnmetAuthorizations(_) => "Not authorized",
            Self::EntityDoesNotExist(_) => "Entity not found",
            Self::InvalidArgument(_) | Self::Types(_) => "Invalid argument",
            Self::Transaction(err) => match err.status() {
                TransactionStatus::Rejected => "Transaction rejected",
                TransactionStatus::Aborted => "Transaction aborted",
                _ => "Transaction failed",
            },
            Self::AlreadyResolved { .. } | Self::InvalidStatusTransition { .. } => {
                "Invalid transaction state"
            }
            Self::Query(_) => "Chain query failed",
            Self::Submission(_) => "Transaction submission failed",
            Self::UnresolvedResult(_) => "Result unavailable",
            Self::Json(_) => "Failed to process data",
            Self::Url(_) => "Invalid URL",
            Self::Config(_) => "Configuration error",
            Self::Internal(_) => "Internal error",
            Self::Other(_) => "An error occurred",
        }
    }
}

fn sanitize_string(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let lower = cleaned.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
        }
    }

    if cleaned.chars().count() > MAX_ERROR_MESSAGE_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
        format!(
            "{truncated}... [truncated, total length: {}]",
            cleaned.chars().count()
        )
    } else {
        cleaned
    }
}
