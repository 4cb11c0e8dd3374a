//! Several calls submitted under one signature and settled atomically.
//!
//! The calls are dispatched through `utility.batchAtomic`: either all of them
//! take effect or none does. A batch therefore has a single status, and a
//! failing call is reported as [`TransactionError::BatchInterrupted`] carrying
//! that call's index.

use crate::chain::{Extrinsic, Receipt};
use crate::context::Context;
use crate::error::PolymeshResult;
use crate::transaction::base::TransactionCore;
use crate::transaction::events::{StatusUpdate, Subscription};
use crate::transaction::fees::{self, PayingAccountFees};
use crate::transaction::{
    PolymeshTransaction, TransactionError, TransactionSpec, TransactionStatus,
};
use polymesh_sdk_types::{TxTag, H256};
use tokio_util::sync::CancellationToken;

/// An atomic batch of [`TransactionSpec`]s.
#[derive(Debug)]
pub struct PolymeshTransactionBatch {
    specs: Vec<TransactionSpec>,
    core: TransactionCore,
}

impl PolymeshTransactionBatch {
    pub(crate) fn new(specs: Vec<TransactionSpec>, context: Context) -> Self {
        Self {
            specs,
            core: TransactionCore::new(context),
        }
    }

    /// The batched calls, in dispatch order.
    pub fn specs(&self) -> &[TransactionSpec] {
        &self.specs
    }

    /// The tags of the batched calls.
    pub fn tags(&self) -> Vec<TxTag> {
        self.specs.iter().map(|s| s.tag().clone()).collect()
    }

    /// Number of calls.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the batch has no calls.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Current status.
    pub fn status(&self) -> TransactionStatus {
        self.core.status()
    }

    /// Hash of the extrinsic, once broadcast.
    pub fn tx_hash(&self) -> Option<H256> {
        self.core.tx_hash()
    }

    /// The receipt, once finalized.
    pub fn receipt(&self) -> Option<&Receipt> {
        self.core.receipt()
    }

    /// Why the batch did not succeed, once settled.
    pub fn error(&self) -> Option<&TransactionError> {
        self.core.error()
    }

    /// Returns true if any call is critical.
    pub fn is_critical(&self) -> bool {
        self.specs.iter().any(TransactionSpec::is_critical)
    }

    /// Returns true if a subsidizer may pay for every call.
    pub fn supports_subsidy(&self) -> bool {
        self.specs.iter().all(|s| fees::is_subsidizable(s.tag()))
    }

    /// Calls `listener` on every status change until the returned handle is
    /// dropped.
    pub fn on_status_change(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.core.on_status_change(listener)
    }

    /// A token that cancels the batch if triggered before submission.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.core.cancel_handle()
    }

    /// Rejects the batch without submitting it. Only possible while `Idle`.
    pub fn cancel(&mut self) -> PolymeshResult<()> {
        self.core.cancel()
    }

    /// Fees summed over the calls, and the account that pays them.
    pub async fn total_fees(&self) -> PolymeshResult<PayingAccountFees> {
        fees::total_fees(self.core.context(), &self.specs, self.supports_subsidy()).await
    }

    /// The extrinsic this batch submits.
    pub fn extrinsic(&self) -> Extrinsic {
        Extrinsic::BatchAtomic(self.specs.iter().map(TransactionSpec::call_data).collect())
    }

    /// Submits the batch and waits for it to settle.
    pub async fn run(&mut self) -> PolymeshResult<Receipt> {
        let check_fees = self.core.context().config().check_fees();
        self.run_with(check_fees).await
    }

    pub(crate) async fn run_with(&mut self, check_fees: bool) -> PolymeshResult<Receipt> {
        self.core.begin()?;
        if check_fees {
            self.total_fees().await?.ensure_affordable()?;
        }
        let extrinsic = self.extrinsic();
        self.core.execute(extrinsic, &self.specs).await
    }

    /// Turns an idle batch into one transaction per call, keeping each call's
    /// resolver. The calls are no longer atomic.
    pub fn split(self) -> PolymeshResult<Vec<PolymeshTransaction>> {
        let status = self.status();
        if status != TransactionStatus::Idle {
            status.check_transition(TransactionStatus::Unapproved)?;
        }
        let context = self.core.context().clone();
        Ok(self
            .specs
            .into_iter()
            .map(|spec| PolymeshTransaction::new(spec, context.clone()))
            .collect())
    }
}
