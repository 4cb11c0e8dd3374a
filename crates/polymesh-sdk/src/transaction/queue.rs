//! Sequential execution of the transactions a Procedure produced.

use crate::authorization::AuthorizationStatus;
use crate::chain::Receipt;
use crate::context::Context;
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{MaybePostValue, PreparedEntry};
use crate::transaction::events::{Listeners, StatusUpdate, Subscription};
use crate::transaction::fees::{Fees, PayingAccount, PayingAccountFees};
use crate::transaction::status::StatusCell;
use crate::transaction::{
    PolymeshTransaction, PolymeshTransactionBatch, TransactionError, TransactionStatus,
};
use polymesh_sdk_types::{Balance, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// An entry of a [`TransactionQueue`].
#[derive(Debug)]
pub enum QueueEntry {
    /// A single call.
    Single(PolymeshTransaction),
    /// An atomic batch.
    Batch(PolymeshTransactionBatch),
}

impl QueueEntry {
    /// Current status.
    pub fn status(&self) -> TransactionStatus {
        match self {
            Self::Single(tx) => tx.status(),
            Self::Batch(batch) => batch.status(),
        }
    }

    /// Hash of the extrinsic, once broadcast.
    pub fn tx_hash(&self) -> Option<H256> {
        match self {
            Self::Single(tx) => tx.tx_hash(),
            Self::Batch(batch) => batch.tx_hash(),
        }
    }

    /// The receipt, once finalized.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Single(tx) => tx.receipt(),
            Self::Batch(batch) => batch.receipt(),
        }
    }

    /// Why the entry did not succeed, once settled.
    pub fn error(&self) -> Option<&TransactionError> {
        match self {
            Self::Single(tx) => tx.error(),
            Self::Batch(batch) => batch.error(),
        }
    }

    /// Returns true if failure of this entry stops the queue.
    pub fn is_critical(&self) -> bool {
        match self {
            Self::Single(tx) => tx.is_critical(),
            Self::Batch(batch) => batch.is_critical(),
        }
    }

    /// Returns true if a subsidizer may pay for this entry.
    pub fn supports_subsidy(&self) -> bool {
        match self {
            Self::Single(tx) => tx.supports_subsidy(),
            Self::Batch(batch) => batch.supports_subsidy(),
        }
    }

    /// Calls `listener` on every status change of this entry.
    pub fn on_status_change(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        match self {
            Self::Single(tx) => tx.on_status_change(listener),
            Self::Batch(batch) => batch.on_status_change(listener),
        }
    }

    /// Fees of this entry and who pays them.
    pub async fn total_fees(&self) -> PolymeshResult<PayingAccountFees> {
        match self {
            Self::Single(tx) => tx.total_fees().await,
            Self::Batch(batch) => batch.total_fees().await,
        }
    }

    async fn run_with(&mut self, check_fees: bool) -> PolymeshResult<Receipt> {
        match self {
            Self::Single(tx) => tx.run_with(check_fees).await,
            Self::Batch(batch) => batch.run_with(check_fees).await,
        }
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(tx) => write!(f, "{}", tx.tag()),
            Self::Batch(batch) => {
                let tags: Vec<String> = batch.tags().iter().map(ToString::to_string).collect();
                write!(f, "batch[{}]", tags.join(", "))
            }
        }
    }
}

/// Fees of every queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueFees {
    /// Fees per entry, in queue order.
    pub entries: Vec<PayingAccountFees>,
    /// Sum over all entries.
    pub total: Fees,
}

impl QueueFees {
    /// Fails with `InsufficientBalance` if any paying account cannot cover the
    /// sum of the fees it pays.
    pub fn ensure_affordable(&self) -> PolymeshResult<()> {
        let mut owed: Vec<(&PayingAccount, Balance)> = Vec::new();
        for entry in &self.entries {
            let total = entry.fees.total();
            match owed
                .iter_mut()
                .find(|(payer, _)| payer.account() == entry.paying_account.account())
            {
                Some((_, sum)) => *sum = sum.saturating_add(total),
                None => owed.push((&entry.paying_account, total)),
            }
        }
        owed.into_iter()
            .try_for_each(|(payer, required)| payer.ensure_covers(required))
    }
}

/// The ordered transactions produced by a Procedure, and the Procedure's
/// result once they ran.
///
/// Entries run one at a time in order. A critical entry that does not succeed
/// stops the queue; later entries stay `Idle`. Non-critical failures are
/// recorded and the queue moves on.
pub struct TransactionQueue<T> {
    procedure: &'static str,
    entries: Vec<QueueEntry>,
    result: MaybePostValue<T>,
    authorization: AuthorizationStatus,
    cell: StatusCell,
    entry_listeners: Listeners<(usize, StatusUpdate)>,
    _forwarding: Vec<Subscription>,
    context: Context,
}

impl<T: Clone + Send + Sync + 'static> TransactionQueue<T> {
    pub(crate) fn new(
        procedure: &'static str,
        prepared: Vec<PreparedEntry>,
        result: MaybePostValue<T>,
        authorization: AuthorizationStatus,
        context: Context,
    ) -> Self {
        let entries: Vec<QueueEntry> = prepared
            .into_iter()
            .map(|entry| match entry {
                PreparedEntry::Single(spec) => {
                    QueueEntry::Single(PolymeshTransaction::new(spec, context.clone()))
                }
                PreparedEntry::Batch(specs) => {
                    QueueEntry::Batch(PolymeshTransactionBatch::new(specs, context.clone()))
                }
            })
            .collect();

        let entry_listeners = Listeners::new();
        let forwarding = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let listeners = entry_listeners.clone();
                entry.on_status_change(move |update| listeners.emit(&(index, update.clone())))
            })
            .collect();

        Self {
            procedure,
            entries,
            result,
            authorization,
            cell: StatusCell::new(),
            entry_listeners,
            _forwarding: forwarding,
            context,
        }
    }

    /// Name of the Procedure that produced this queue.
    pub fn procedure(&self) -> &'static str {
        self.procedure
    }

    /// The entries, in execution order.
    pub fn transactions(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the queue has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate status: `Idle` before running, `Running` while running, then
    /// `Succeeded` if every entry succeeded or the first non-success status.
    pub fn status(&self) -> TransactionStatus {
        self.cell.status()
    }

    /// The first entry failure, once settled.
    pub fn error(&self) -> Option<&TransactionError> {
        self.cell.error()
    }

    /// The merged authorization of the Procedure and every nested Procedure.
    pub fn authorization(&self) -> &AuthorizationStatus {
        &self.authorization
    }

    /// The Procedure's result, if already known.
    pub fn result(&self) -> Option<T> {
        self.result.value()
    }

    /// Calls `listener` on every change of the aggregate status.
    pub fn on_status_change(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.cell.subscribe(listener)
    }

    /// Calls `listener` with the entry index on every entry status change. An
    /// entry's updates are published before the aggregate update they cause.
    pub fn on_transaction_status_change(
        &self,
        listener: impl Fn(usize, &StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.entry_listeners
            .subscribe(move |(index, update)| listener(*index, update))
    }

    /// Fees of every entry and their sum.
    pub async fn total_fees(&self) -> PolymeshResult<QueueFees> {
        let mut entries = Vec::with_capacity(self.entries.len());
        let mut total = Fees::default();
        for entry in &self.entries {
            let fees = entry.total_fees().await?;
            total = total.add(fees.fees);
            entries.push(fees);
        }
        Ok(QueueFees { entries, total })
    }

    /// Runs every entry in order and returns the Procedure's result.
    ///
    /// Fails with the first critical entry's [`TransactionError`], or with
    /// `UnresolvedResult` if the result depended on an entry that did not
    /// succeed.
    pub async fn run(&mut self) -> PolymeshResult<T> {
        let status = self.status();
        status.check_transition(TransactionStatus::Running)?;

        if self.context.config().check_fees() {
            self.total_fees().await?.ensure_affordable()?;
        }

        self.cell.transition(TransactionStatus::Running, None)?;
        info!(
            procedure = self.procedure,
            transactions = self.entries.len(),
            "Running transaction queue"
        );

        let mut stopped_by = None;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            match entry.run_with(false).await {
                Ok(_) => {}
                Err(PolymeshError::Transaction(err)) if entry.is_critical() => {
                    warn!(
                        procedure = self.procedure,
                        index,
                        entry = %entry,
                        error = %err,
                        "Critical transaction did not succeed, stopping queue"
                    );
                    stopped_by = Some(err);
                    break;
                }
                Err(PolymeshError::Transaction(err)) => {
                    warn!(
                        procedure = self.procedure,
                        index,
                        entry = %entry,
                        error = %err,
                        "Non-critical transaction did not succeed"
                    );
                }
                Err(other) => {
                    let err = TransactionError::Aborted {
                        reason: other.to_string(),
                    };
                    self.cell.transition(TransactionStatus::Aborted, Some(err))?;
                    return Err(other);
                }
            }
        }

        let aggregate = self
            .entries
            .iter()
            .map(QueueEntry::status)
            .find(|s| *s != TransactionStatus::Succeeded)
            .unwrap_or(TransactionStatus::Succeeded);
        let first_error = self.entries.iter().find_map(|e| e.error().cloned());
        self.cell.transition(aggregate, first_error)?;
        info!(
            procedure = self.procedure,
            status = %aggregate,
            "Transaction queue settled"
        );

        if let Some(err) = stopped_by {
            return Err(err.into());
        }
        self.result.resolve()
    }
}

impl<T> fmt::Debug for TransactionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionQueue")
            .field("procedure", &self.procedure)
            .field("entries", &self.entries)
            .field("status", &self.cell.status())
            .field("authorization", &self.authorization)
            .finish_non_exhaustive()
    }
}
