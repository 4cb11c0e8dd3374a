//! Transaction status and the forward-only state machine shared by
//! transactions, batches and queues.

use crate::error::{PolymeshError, PolymeshResult};
use crate::transaction::events::{Listeners, StatusUpdate, Subscription};
use crate::transaction::TransactionError;
use polymesh_sdk_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lifecycle status of a transaction.
///
/// Statuses are ordered `Idle < Unapproved < Running < terminal`. A status can
/// only move forward, and exactly one terminal status is ever reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    /// Built, not yet submitted.
    Idle,
    /// Handed to the signer, waiting for approval.
    Unapproved,
    /// Signed and broadcast, waiting for finalization.
    Running,
    /// Included and accepted by the runtime.
    Succeeded,
    /// Included but rejected by the runtime.
    Failed,
    /// Refused by the node before inclusion.
    Aborted,
    /// Declined by the signer, or cancelled before submission.
    Rejected,
}

impl TransactionStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Unapproved => 1,
            Self::Running => 2,
            Self::Succeeded | Self::Failed | Self::Aborted | Self::Rejected => 3,
        }
    }

    /// Returns true for `Succeeded`, `Failed`, `Aborted` and `Rejected`.
    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    /// Returns the name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Unapproved => "Unapproved",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Aborted => "Aborted",
            Self::Rejected => "Rejected",
        }
    }

    /// Checks that moving from `self` to `to` is a forward transition.
    pub fn check_transition(self, to: TransactionStatus) -> PolymeshResult<()> {
        if self.is_terminal() {
            return Err(PolymeshError::AlreadyResolved { status: self });
        }
        if to.rank() <= self.rank() {
            return Err(PolymeshError::InvalidStatusTransition { from: self, to });
        }
        Ok(())
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status together with the listeners observing it.
#[derive(Debug)]
pub(crate) struct StatusCell {
    status: TransactionStatus,
    tx_hash: Option<H256>,
    error: Option<TransactionError>,
    listeners: Listeners<StatusUpdate>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self {
            status: TransactionStatus::Idle,
            tx_hash: None,
            error: None,
            listeners: Listeners::new(),
        }
    }

    pub(crate) fn status(&self) -> TransactionStatus {
        self.status
    }

    pub(crate) fn tx_hash(&self) -> Option<H256> {
        self.tx_hash
    }

    pub(crate) fn error(&self) -> Option<&TransactionError> {
        self.error.as_ref()
    }

    pub(crate) fn set_tx_hash(&mut self, hash: H256) {
        self.tx_hash = Some(hash);
    }

    pub(crate) fn subscribe(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Moves to `to`, recording `error`, and notifies listeners.
    pub(crate) fn transition(
        &mut self,
        to: TransactionStatus,
        error: Option<TransactionError>,
    ) -> PolymeshResult<()> {
        self.status.check_transition(to)?;
        debug!(from = %self.status, to = %to, "Status transition");
        self.status = to;
        if error.is_some() {
            self.error = error;
        }
        self.listeners.emit(&StatusUpdate {
            status: to,
            tx_hash: self.tx_hash,
            error: self.error.clone(),
        });
        Ok(())
    }
}
