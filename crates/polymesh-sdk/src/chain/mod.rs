//! The chain-facing data model consumed and produced by the engine.
//!
//! The engine owns no wire format. Calls leave it as [`Extrinsic`] values
//! (a tag plus JSON-encoded arguments) for the codec layer behind the
//! [`Submitter`](crate::context::Submitter) to encode, and outcomes come back
//! as [`SubmissionEvent`]s carrying already-decoded [`Receipt`]s.

mod dispatch;
mod receipt;

pub use dispatch::{ArithmeticError, DispatchError, DispatchErrorKind};
pub use receipt::{BatchInterruption, ChainEvent, Receipt};

use polymesh_sdk_types::{tags, TxTag, H256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One chain call: a tag and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallData {
    /// The call identifier.
    pub tag: TxTag,
    /// Positional arguments, in declaration order.
    pub args: Vec<serde_json::Value>,
}

impl CallData {
    /// Creates call data.
    pub fn new(tag: TxTag, args: Vec<serde_json::Value>) -> Self {
        Self { tag, args }
    }
}

/// What gets signed and submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "calls", rename_all = "camelCase")]
pub enum Extrinsic {
    /// A single call.
    Call(CallData),
    /// Several calls dispatched through `utility.batchAtomic`. Either every call
    /// takes effect or none does.
    BatchAtomic(Vec<CallData>),
}

impl Extrinsic {
    /// The outer call tag: the call's own tag, or `utility.batchAtomic`.
    pub fn tag(&self) -> TxTag {
        match self {
            Extrinsic::Call(call) => call.tag.clone(),
            Extrinsic::BatchAtomic(_) => tags::batch_atomic(),
        }
    }

    /// The calls this extrinsic dispatches.
    pub fn calls(&self) -> &[CallData] {
        match self {
            Extrinsic::Call(call) => std::slice::from_ref(call),
            Extrinsic::BatchAtomic(calls) => calls,
        }
    }
}

impl fmt::Display for Extrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extrinsic::Call(call) => write!(f, "{}", call.tag),
            Extrinsic::BatchAtomic(calls) => {
                write!(f, "{}[", tags::batch_atomic())?;
                for (i, call) in calls.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", call.tag)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A lifecycle event reported by the submission primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// The extrinsic was handed to the signer and awaits approval.
    Unapproved,
    /// The signer declined to sign.
    Rejected {
        /// Reason given by the signer.
        reason: String,
    },
    /// The extrinsic was signed and broadcast.
    Running {
        /// Hash of the broadcast extrinsic.
        tx_hash: H256,
    },
    /// The extrinsic was included in a finalized block.
    Finalized(Receipt),
    /// The node refused the extrinsic before inclusion (e.g. a stale nonce).
    Invalid {
        /// Reason reported by the node.
        reason: String,
    },
}

impl SubmissionEvent {
    /// Returns true if no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionEvent::Rejected { .. }
                | SubmissionEvent::Finalized(_)
                | SubmissionEvent::Invalid { .. }
        )
    }
}
