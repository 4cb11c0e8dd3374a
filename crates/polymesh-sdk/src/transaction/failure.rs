//! Outcomes attached to transactions that did not succeed.

use crate::chain::DispatchError;
use crate::transaction::TransactionStatus;
use thiserror::Error;

/// Why a transaction ended in a non-success terminal status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    /// The signer declined to sign
    #[error("Transaction rejected by the signer: {reason}")]
    Rejected {
        /// Reason given by the signer
        reason: String,
    },

    /// The transaction was cancelled before submission
    #[error("Transaction cancelled before submission")]
    Cancelled,

    /// The node refused the extrinsic before inclusion
    #[error("Transaction aborted: {reason}")]
    Aborted {
        /// Reason reported by the node
        reason: String,
    },

    /// The runtime rejected the dispatched call
    #[error("Transaction failed: {0}")]
    Failed(DispatchError),

    /// A call of an atomic batch failed, reverting the whole batch
    #[error("Batch interrupted at call {index}: {error}")]
    BatchInterrupted {
        /// Position of the failing call
        index: usize,
        /// Why it failed
        error: DispatchError,
    },

    /// The call succeeded but its receipt could not be processed
    #[error("Failed to process transaction receipt: {0}")]
    Resolver(String),
}

impl TransactionError {
    /// The terminal status a transaction settles with for this outcome.
    pub fn status(&self) -> TransactionStatus {
        match self {
            Self::Rejected { .. } | Self::Cancelled => TransactionStatus::Rejected,
            Self::Aborted { .. } => TransactionStatus::Aborted,
            Self::Failed(_) | Self::BatchInterrupted { .. } | Self::Resolver(_) => {
                TransactionStatus::Failed
            }
        }
    }

    /// The dispatch error reported by the chain, if any.
    pub fn dispatch_error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed(error) | Self::BatchInterrupted { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TransactionError::Rejected { reason: "no".into() }.status(),
            TransactionStatus::Rejected
        );
        assert_eq!(TransactionError::Cancelled.status(), TransactionStatus::Rejected);
        assert_eq!(
            TransactionError::Aborted { reason: "nonce".into() }.status(),
            TransactionStatus::Aborted
        );
        assert_eq!(
            TransactionError::Failed(DispatchError::BadOrigin).status(),
            TransactionStatus::Failed
        );
        assert_eq!(
            TransactionError::Resolver("missing event".into()).status(),
            TransactionStatus::Failed
        );
    }

    #[test]
    fn test_batch_interrupted_carries_leg() {
        let err = TransactionError::BatchInterrupted {
            index: 2,
            error: DispatchError::module("asset", "Unauthorized", Vec::<String>::new()),
        };
        assert_eq!(err.status(), TransactionStatus::Failed);
        assert_eq!(err.to_string(), "Batch interrupted at call 2: asset.Unauthorized");
        assert!(err
            .dispatch_error()
            .is_some_and(|e| e.is_module_error("asset", "Unauthorized")));
    }
}
