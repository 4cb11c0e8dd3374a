//! Immutable descriptions of single chain calls.

use crate::chain::{CallData, Receipt};
use crate::error::PolymeshResult;
use polymesh_sdk_types::TxTag;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A hook run against the receipt of a successful transaction.
pub type ReceiptHook = Arc<dyn Fn(&Receipt) -> PolymeshResult<()> + Send + Sync>;

/// Exactly one chain call, as produced by a Procedure.
///
/// Specs are assembled with the consuming `with_*` methods and never change
/// once handed to the accumulator.
#[derive(Clone)]
pub struct TransactionSpec {
    tag: TxTag,
    args: Vec<serde_json::Value>,
    fee_multiplier: u32,
    resolver: Option<ReceiptHook>,
    is_critical: bool,
}

impl TransactionSpec {
    /// Creates a critical spec for `tag` with already-encoded arguments.
    pub fn new(tag: TxTag, args: Vec<serde_json::Value>) -> Self {
        Self {
            tag,
            args,
            fee_multiplier: 1,
            resolver: None,
            is_critical: true,
        }
    }

    /// Creates a spec, serializing each argument.
    pub fn with_args<A: Serialize>(tag: TxTag, args: &[A]) -> PolymeshResult<Self> {
        let args = args
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(tag, args))
    }

    /// Scales the protocol fee, for calls charged per item.
    pub fn with_fee_multiplier(mut self, multiplier: u32) -> Self {
        self.fee_multiplier = multiplier;
        self
    }

    /// Marks the call as non-critical: its failure does not stop the queue.
    pub fn non_critical(mut self) -> Self {
        self.is_critical = false;
        self
    }

    pub(crate) fn with_resolver(mut self, resolver: ReceiptHook) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The call identifier.
    pub fn tag(&self) -> &TxTag {
        &self.tag
    }

    /// The positional arguments.
    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }

    /// The protocol fee multiplier, 1 unless set.
    pub fn fee_multiplier(&self) -> u32 {
        self.fee_multiplier
    }

    /// Returns true if failure of this call must stop the queue.
    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    pub(crate) fn resolver(&self) -> Option<&ReceiptHook> {
        self.resolver.as_ref()
    }

    /// The call as handed to the submitter.
    pub fn call_data(&self) -> CallData {
        CallData::new(self.tag.clone(), self.args.clone())
    }
}

impl fmt::Debug for TransactionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSpec")
            .field("tag", &self.tag)
            .field("args", &self.args)
            .field("fee_multiplier", &self.fee_multiplier)
            .field("has_resolver", &self.resolver.is_some())
            .field("is_critical", &self.is_critical)
            .finish()
    }
}
