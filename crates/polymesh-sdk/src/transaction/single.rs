//! A single monitorable chain call.

use crate::chain::{Extrinsic, Receipt};
use crate::context::Context;
use crate::error::PolymeshResult;
use crate::transaction::base::TransactionCore;
use crate::transaction::events::{StatusUpdate, Subscription};
use crate::transaction::fees::{self, PayingAccountFees};
use crate::transaction::{TransactionError, TransactionSpec, TransactionStatus};
use polymesh_sdk_types::{TxTag, H256};
use tokio_util::sync::CancellationToken;

/// One [`TransactionSpec`] wrapped with a status machine, fee computation and
/// cancellation.
#[derive(Debug)]
pub struct PolymeshTransaction {
    spec: TransactionSpec,
    core: TransactionCore,
}

impl PolymeshTransaction {
    pub(crate) fn new(spec: TransactionSpec, context: Context) -> Self {
        Self {
            spec,
            core: TransactionCore::new(context),
        }
    }

    /// The wrapped call.
    pub fn spec(&self) -> &TransactionSpec {
        &self.spec
    }

    /// The call identifier.
    pub fn tag(&self) -> &TxTag {
        self.spec.tag()
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

    /// Why the transaction did not succeed, once settled.
    pub fn error(&self) -> Option<&TransactionError> {
        self.core.error()
    }

    /// Returns true if failure of this transaction stops its queue.
    pub fn is_critical(&self) -> bool {
        self.spec.is_critical()
    }

    /// Returns true if a subsidizer may pay for this call.
    pub fn supports_subsidy(&self) -> bool {
        fees::is_subsidizable(self.spec.tag())
    }

    /// Calls `listener` on every status change until the returned handle is
    /// dropped.
    pub fn on_status_change(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.core.on_status_change(listener)
    }

    /// A token that cancels the transaction if triggered before submission.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.core.cancel_handle()
    }

    /// Rejects the transaction without submitting it. Only possible while
    /// `Idle`.
    pub fn cancel(&mut self) -> PolymeshResult<()> {
        self.core.cancel()
    }

    /// Protocol and gas fees, and the account that pays them.
    pub async fn total_fees(&self) -> PolymeshResult<PayingAccountFees> {
        fees::total_fees(
            self.core.context(),
            std::slice::from_ref(&self.spec),
            self.supports_subsidy(),
        )
        .await
    }

    /// Submits the call and waits for it to settle.
    ///
    /// With fee checks enabled, fails with `InsufficientBalance` before
    /// submitting if the paying account cannot cover the fees.
    pub async fn run(&mut self) -> PolymeshResult<Receipt> {
        let check_fees = self.core.context().config().check_fees();
        self.run_with(check_fees).await
    }

    pub(crate) async fn run_with(&mut self, check_fees: bool) -> PolymeshResult<Receipt> {
        self.core.begin()?;
        if check_fees {
            self.total_fees().await?.ensure_affordable()?;
        }
        self.core
            .execute(
                Extrinsic::Call(self.spec.call_data()),
                std::slice::from_ref(&self.spec),
            )
            .await
    }
}
