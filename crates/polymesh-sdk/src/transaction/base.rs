//! The submission driver shared by single transactions and batches.

use crate::chain::{DispatchError, Extrinsic, Receipt, SubmissionEvent};
use crate::context::Context;
use crate::error::{PolymeshError, PolymeshResult};
use crate::transaction::events::{StatusUpdate, Subscription};
use crate::transaction::status::StatusCell;
use crate::transaction::{TransactionError, TransactionSpec, TransactionStatus};
use futures::StreamExt;
use polymesh_sdk_types::H256;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STREAM_ENDED: &str = "submission stream ended before the transaction settled";

/// Status, receipt and cancellation state of one extrinsic.
#[derive(Debug)]
pub(crate) struct TransactionCore {
    cell: StatusCell,
    receipt: Option<Receipt>,
    cancel: CancellationToken,
    context: Context,
}

impl TransactionCore {
    pub(crate) fn new(context: Context) -> Self {
        Self {
            cell: StatusCell::new(),
            receipt: None,
            cancel: CancellationToken::new(),
            context,
        }
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn status(&self) -> TransactionStatus {
        self.cell.status()
    }

    pub(crate) fn tx_hash(&self) -> Option<H256> {
        self.cell.tx_hash()
    }

    pub(crate) fn error(&self) -> Option<&TransactionError> {
        self.cell.error()
    }

    pub(crate) fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    pub(crate) fn on_status_change(
        &self,
        listener: impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub(crate) fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Rejects an idle transaction without submitting it.
    pub(crate) fn cancel(&mut self) -> PolymeshResult<()> {
        let status = self.status();
        if status != TransactionStatus::Idle {
            status.check_transition(TransactionStatus::Rejected)?;
            return Err(PolymeshError::InvalidStatusTransition {
                from: status,
                to: TransactionStatus::Rejected,
            });
        }
        self.cancel.cancel();
        self.cell
            .transition(TransactionStatus::Rejected, Some(TransactionError::Cancelled))
    }

    /// Checks that the transaction may still be submitted. A cancelled idle
    /// transaction settles as `Rejected` here.
    pub(crate) fn begin(&mut self) -> PolymeshResult<()> {
        let status = self.status();
        if status != TransactionStatus::Idle {
            status.check_transition(TransactionStatus::Unapproved)?;
            return Err(PolymeshError::InvalidStatusTransition {
                from: status,
                to: TransactionStatus::Unapproved,
            });
        }
        if self.cancel.is_cancelled() {
            return self.fail(TransactionError::Cancelled).map(|_| ());
        }
        Ok(())
    }

    /// Submits `extrinsic` and follows its events to a terminal status.
    ///
    /// `specs` are the calls the extrinsic dispatches; their resolvers run in
    /// order against the receipt once the runtime accepted the extrinsic.
    pub(crate) async fn execute(
        &mut self,
        extrinsic: Extrinsic,
        specs: &[TransactionSpec],
    ) -> PolymeshResult<Receipt> {
        self.begin()?;

        let label = extrinsic.to_string();
        let batched = matches!(extrinsic, Extrinsic::BatchAtomic(_));
        let signer = *self.context.signing_account();
        info!(call = %label, signer = %signer, "Submitting transaction");

        let mut events = match self.context.submitter().submit(extrinsic, &signer).await {
            Ok(events) => events,
            Err(err) => {
                return self.fail(TransactionError::Aborted {
                    reason: err.to_string(),
                })
            }
        };

        while let Some(event) = events.next().await {
            let status = self.status();
            match event {
                SubmissionEvent::Unapproved if status == TransactionStatus::Idle => {
                    self.cell.transition(TransactionStatus::Unapproved, None)?;
                }
                SubmissionEvent::Running { tx_hash } if awaiting_broadcast(status) => {
                    self.cell.set_tx_hash(tx_hash);
                    self.cell.transition(TransactionStatus::Running, None)?;
                    info!(call = %label, txn_hash = %tx_hash, "Transaction broadcast");
                }
                SubmissionEvent::Rejected { reason } if awaiting_broadcast(status) => {
                    return self.fail(TransactionError::Rejected { reason });
                }
                SubmissionEvent::Invalid { reason } => {
                    return self.fail(TransactionError::Aborted { reason });
                }
                SubmissionEvent::Finalized(receipt) => {
                    self.cell.set_tx_hash(receipt.tx_hash);
                    let outcome = classify(&receipt, batched, specs);
                    self.receipt = Some(receipt.clone());
                    return match outcome {
                        Ok(()) => {
                            self.cell.transition(TransactionStatus::Succeeded, None)?;
                            info!(
                                call = %label,
                                txn_hash = %receipt.tx_hash,
                                block = receipt.block_number,
                                "Transaction succeeded"
                            );
                            Ok(receipt)
                        }
                        Err(err) => self.fail(err),
                    };
                }
                other => {
                    warn!(
                        call = %label,
                        status = %status,
                        event = ?other,
                        "Ignoring out-of-order submission event"
                    );
                }
            }
        }

        self.fail(TransactionError::Aborted {
            reason: STREAM_ENDED.to_string(),
        })
    }

    fn fail(&mut self, err: TransactionError) -> PolymeshResult<Receipt> {
        self.cell.transition(err.status(), Some(err.clone()))?;
        warn!(
            status = %err.status(),
            txn_hash = ?self.tx_hash(),
            error = %err,
            "Transaction did not succeed"
        );
        Err(err.into())
    }
}

fn awaiting_broadcast(status: TransactionStatus) -> bool {
    matches!(
        status,
        TransactionStatus::Idle | TransactionStatus::Unapproved
    )
}

/// Decides the outcome of a finalized extrinsic.
fn classify(
    receipt: &Receipt,
    batched: bool,
    specs: &[TransactionSpec],
) -> Result<(), TransactionError> {
    if batched {
        match receipt.batch_interruption() {
            Ok(Some(interruption)) => {
                return Err(TransactionError::BatchInterrupted {
                    index: interruption.index,
                    error: interruption.error,
                })
            }
            Ok(None) => {}
            Err(err) => {
                return Err(TransactionError::Failed(DispatchError::Other {
                    message: err.to_string(),
                }))
            }
        }
    }

    if let Some(error) = &receipt.dispatch_error {
        return Err(TransactionError::Failed(error.clone()));
    }

    for spec in specs {
        if let Some(resolver) = spec.resolver() {
            resolver(receipt).map_err(|err| TransactionError::Resolver(err.to_string()))?;
        }
    }
    debug!(calls = specs.len(), "Receipt processed");
    Ok(())
}
