//! End-to-end tests of the transaction engine against an in-memory chain.

pub(crate) mod fakes;

#[cfg(test)]
mod lifecycle_tests {
    use super::fakes::{
        alice_asset, failed_with, finalized, receipt, succeeded_with, ticker, Harness, Script,
        ALICE, BOB,
    };
    use crate::authorization::AuthorizationStatus;
    use crate::chain::{BatchInterruption, ChainEvent, DispatchError, SubmissionEvent};
    use crate::config::PolymeshConfig;
    use crate::context::Subsidy;
    use crate::error::PolymeshError;
    use crate::procedure::{MaybePostValue, PreparedEntry, Procedure, TransactionAccumulator};
    use crate::procedures::{ToggleFreezeArgs, ToggleFreezeAsset};
    use crate::transaction::{
        PayingAccount, PolymeshTransaction, PolymeshTransactionBatch, TransactionError,
        TransactionQueue, TransactionSpec, TransactionStatus,
    };
    use polymesh_sdk_types::{tags, Balance, H256};
    use std::sync::{Arc, Mutex};

    fn spec(tag: polymesh_sdk_types::TxTag) -> TransactionSpec {
        TransactionSpec::new(tag, vec![])
    }

    fn queue_of(h: &Harness, entries: Vec<PreparedEntry>) -> TransactionQueue<()> {
        TransactionQueue::new(
            "test",
            entries,
            MaybePostValue::Ready(()),
            AuthorizationStatus::authorized(),
            h.ctx.clone(),
        )
    }

    fn already_frozen() -> DispatchError {
        DispatchError::module("asset", "AlreadyFrozen", ["The asset is already frozen."])
    }

    #[tokio::test]
    async fn test_no_data_change_submits_nothing() {
        let h = Harness::new();
        h.chain.add_asset(crate::context::AssetDetails {
            frozen: true,
            ..alice_asset("ACME")
        });

        let err = ToggleFreezeAsset
            .prepare(
                ToggleFreezeArgs {
                    ticker: ticker("ACME"),
                    freeze: true,
                },
                &h.ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PolymeshError::NoDataChange(_)));
        assert!(err.is_validation());
        assert!(h.submitter.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_critical_failure_stops_queue() {
        let h = Harness::new();
        h.submitter.push(failed_with(1, already_frozen()));
        let mut queue = queue_of(
            &h,
            vec![
                PreparedEntry::Single(spec(tags::freeze())),
                PreparedEntry::Single(spec(tags::issue())),
            ],
        );

        let err = queue.run().await.unwrap_err();
        match err {
            PolymeshError::Transaction(TransactionError::Failed(dispatch)) => {
                assert!(dispatch.is_module_error("asset", "AlreadyFrozen"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(queue.transactions()[0].status(), TransactionStatus::Failed);
        assert_eq!(queue.transactions()[1].status(), TransactionStatus::Idle);
        assert_eq!(queue.status(), TransactionStatus::Failed);
        assert!(queue.error().is_some());
        assert_eq!(h.submitter.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_critical_outcome_mid_queue_leaves_rest_idle() {
        let outcomes = [
            (
                SubmissionEvent::Rejected {
                    reason: "user declined".into(),
                },
                TransactionStatus::Rejected,
            ),
            (
                SubmissionEvent::Invalid {
                    reason: "stale nonce".into(),
                },
                TransactionStatus::Aborted,
            ),
        ];

        for (outcome, expected) in outcomes {
            let h = Harness::new();
            h.submitter.push(finalized(receipt(1)));
            h.submitter
                .push(Script::Events(vec![SubmissionEvent::Unapproved, outcome]));
            let mut queue = queue_of(
                &h,
                vec![
                    PreparedEntry::Single(spec(tags::issue())),
                    PreparedEntry::Batch(vec![spec(tags::freeze()), spec(tags::issue())]),
                    PreparedEntry::Single(spec(tags::unfreeze())),
                    PreparedEntry::Single(spec(tags::issue())),
                ],
            );

            let err = queue.run().await.unwrap_err();
            assert_eq!(err.transaction_status(), Some(expected));
            let statuses: Vec<TransactionStatus> =
                queue.transactions().iter().map(|e| e.status()).collect();
            assert_eq!(
                statuses,
                vec![
                    TransactionStatus::Succeeded,
                    expected,
                    TransactionStatus::Idle,
                    TransactionStatus::Idle,
                ]
            );
            assert_eq!(queue.status(), expected);
            assert_eq!(queue.error().map(TransactionError::status), Some(expected));
            assert_eq!(h.submitter.submitted().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_non_critical_failure_continues() {
        let h = Harness::new();
        h.submitter.push(failed_with(1, DispatchError::BadOrigin));
        let mut queue = queue_of(
            &h,
            vec![
                PreparedEntry::Single(spec(tags::freeze()).non_critical()),
                PreparedEntry::Single(spec(tags::issue())),
            ],
        );

        queue.run().await.unwrap();
        assert_eq!(queue.transactions()[0].status(), TransactionStatus::Failed);
        assert_eq!(queue.transactions()[1].status(), TransactionStatus::Succeeded);
        assert_eq!(queue.status(), TransactionStatus::Failed);
        assert_eq!(
            queue.error(),
            Some(&TransactionError::Failed(DispatchError::BadOrigin))
        );
        assert_eq!(h.submitter.submitted().len(), 2);
    }

    #[tokio::test]
    async fn test_batch_interruption() {
        let h = Harness::new();
        let interruption = BatchInterruption {
            index: 1,
            error: already_frozen(),
        };
        h.submitter.push(succeeded_with(
            1,
            vec![ChainEvent::new(
                "utility",
                "BatchInterrupted",
                serde_json::to_value(&interruption).unwrap(),
            )],
        ));

        let mut batch = PolymeshTransactionBatch::new(
            vec![spec(tags::issue()), spec(tags::freeze())],
            h.ctx.clone(),
        );
        let err = batch.run().await.unwrap_err();
        assert!(matches!(
            err,
            PolymeshError::Transaction(TransactionError::BatchInterrupted { index: 1, .. })
        ));
        assert_eq!(batch.status(), TransactionStatus::Failed);
        assert_eq!(
            batch.error().and_then(TransactionError::dispatch_error),
            Some(&already_frozen())
        );
    }

    #[tokio::test]
    async fn test_batch_dispatch_error_without_interruption() {
        let h = Harness::new();
        h.submitter.push(failed_with(1, DispatchError::BadOrigin));

        let mut batch = PolymeshTransactionBatch::new(
            vec![spec(tags::issue()), spec(tags::freeze())],
            h.ctx.clone(),
        );
        let err = batch.run().await.unwrap_err();
        assert!(matches!(
            err,
            PolymeshError::Transaction(TransactionError::Failed(DispatchError::BadOrigin))
        ));
        assert_eq!(batch.status(), TransactionStatus::Failed);
        assert_eq!(
            batch.error(),
            Some(&TransactionError::Failed(DispatchError::BadOrigin))
        );
        assert!(batch.receipt().is_some());
    }

    #[tokio::test]
    async fn test_cancel_before_submission() {
        let h = Harness::new();
        let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());
        tx.cancel_handle().cancel();

        let err = tx.run().await.unwrap_err();
        assert!(matches!(
            err,
            PolymeshError::Transaction(TransactionError::Cancelled)
        ));
        assert_eq!(tx.status(), TransactionStatus::Rejected);
        assert!(h.submitter.submitted().is_empty());

        assert!(matches!(
            tx.run().await,
            Err(PolymeshError::AlreadyResolved {
                status: TransactionStatus::Rejected
            })
        ));
    }

    #[tokio::test]
    async fn test_cancel_settles_idle_transaction() {
        let h = Harness::new();
        let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());
        tx.cancel().unwrap();
        assert_eq!(tx.status(), TransactionStatus::Rejected);
        assert_eq!(tx.error(), Some(&TransactionError::Cancelled));
        assert!(tx.cancel().is_err());
    }

    #[tokio::test]
    async fn test_signer_rejection() {
        let h = Harness::new();
        h.submitter.push(Script::Events(vec![
            SubmissionEvent::Unapproved,
            SubmissionEvent::Rejected {
                reason: "user declined".into(),
            },
        ]));
        let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());

        let err = tx.run().await.unwrap_err();
        assert_eq!(err.transaction_status(), Some(TransactionStatus::Rejected));
        assert_eq!(tx.status(), TransactionStatus::Rejected);
        assert!(tx.tx_hash().is_none());
    }

    #[tokio::test]
    async fn test_aborted_outcomes() {
        let h = Harness::new();
        h.submitter.push(Script::Events(vec![
            SubmissionEvent::Unapproved,
            SubmissionEvent::Invalid {
                reason: "stale nonce".into(),
            },
        ]));
        h.submitter.push(Script::Events(vec![SubmissionEvent::Unapproved]));
        h.submitter
            .push(Script::SubmitError("connection refused".into()));

        for _ in 0..3 {
            let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());
            let err = tx.run().await.unwrap_err();
            assert!(err.is_retryable());
            assert_eq!(tx.status(), TransactionStatus::Aborted);
        }
    }

    #[tokio::test]
    async fn test_out_of_order_events_are_ignored() {
        let h = Harness::new();
        let hash = H256::repeat_byte(7);
        h.submitter.push(Script::Events(vec![
            SubmissionEvent::Running { tx_hash: hash },
            SubmissionEvent::Unapproved,
            SubmissionEvent::Rejected {
                reason: "late".into(),
            },
            SubmissionEvent::Finalized(receipt(7)),
        ]));
        let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());

        let statuses = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&statuses);
        let _sub = tx.on_status_change(move |u| seen.lock().unwrap().push(u.status));

        let receipt = tx.run().await.unwrap();
        assert_eq!(receipt.tx_hash, hash);
        assert_eq!(
            *statuses.lock().unwrap(),
            vec![TransactionStatus::Running, TransactionStatus::Succeeded]
        );
    }

    #[tokio::test]
    async fn test_fee_check_blocks_submission() {
        let h = Harness::new();
        h.chain.set_balance(ALICE, Balance::ZERO);
        let mut queue = queue_of(&h, vec![PreparedEntry::Single(spec(tags::freeze()))]);

        let err = queue.run().await.unwrap_err();
        assert!(matches!(err, PolymeshError::InsufficientBalance { .. }));
        assert_eq!(queue.status(), TransactionStatus::Idle);
        assert!(h.submitter.submitted().is_empty());

        let h = Harness::with_config(PolymeshConfig::local().with_fee_check(false));
        h.chain.set_balance(ALICE, Balance::ZERO);
        let mut queue = queue_of(&h, vec![PreparedEntry::Single(spec(tags::freeze()))]);
        queue.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_subsidizer_pays_eligible_calls() {
        let h = Harness::new();
        h.chain.set_balance(ALICE, Balance::ZERO);
        h.chain.set_subsidy(
            ALICE,
            Subsidy {
                subsidizer: BOB,
                allowance: Balance::from_units(10),
            },
        );

        let tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());
        let fees = tx.total_fees().await.unwrap();
        assert_eq!(
            fees.paying_account,
            PayingAccount::Subsidy {
                account: BOB,
                balance: Balance::from_units(1000),
                allowance: Balance::from_units(10),
            }
        );
        fees.ensure_affordable().unwrap();

        let transfer = PolymeshTransaction::new(spec(tags::transfer_with_memo()), h.ctx.clone());
        assert!(!transfer.supports_subsidy());
        let fees = transfer.total_fees().await.unwrap();
        assert_eq!(fees.paying_account.account(), &ALICE);
        assert!(fees.ensure_affordable().is_err());

        h.chain.set_subsidy(
            ALICE,
            Subsidy {
                subsidizer: BOB,
                allowance: Balance::ZERO,
            },
        );
        let fees = tx.total_fees().await.unwrap();
        assert!(matches!(
            fees.ensure_affordable(),
            Err(PolymeshError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_entry_updates_precede_queue_updates() {
        let h = Harness::new();
        h.submitter.push(finalized(receipt(1)));
        let mut queue = queue_of(&h, vec![PreparedEntry::Single(spec(tags::freeze()))]);

        let log = Arc::new(Mutex::new(Vec::new()));
        let entries = Arc::clone(&log);
        let _entry_sub = queue.on_transaction_status_change(move |index, u| {
            entries.lock().unwrap().push(format!("{index}:{}", u.status))
        });
        let aggregate = Arc::clone(&log);
        let _queue_sub = queue
            .on_status_change(move |u| aggregate.lock().unwrap().push(format!("queue:{}", u.status)));

        queue.run().await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "queue:Running",
                "0:Unapproved",
                "0:Running",
                "0:Succeeded",
                "queue:Succeeded"
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_updates() {
        let h = Harness::new();
        let mut tx = PolymeshTransaction::new(spec(tags::freeze()), h.ctx.clone());
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        let sub = tx.on_status_change(move |_| *seen.lock().unwrap() += 1);
        drop(sub);

        tx.run().await.unwrap();
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_result() {
        let h = Harness::new();
        h.submitter.push(failed_with(1, DispatchError::BadOrigin));

        let (acc, value) = TransactionAccumulator::new(10)
            .add_transaction_with_result(spec(tags::add_authorization()).non_critical(), |r| {
                Ok(r.block_number)
            });
        let (entries, _) = acc.into_parts();
        let mut queue = TransactionQueue::new(
            "test",
            entries,
            MaybePostValue::Pending(value),
            AuthorizationStatus::authorized(),
            h.ctx.clone(),
        );

        assert!(matches!(
            queue.run().await,
            Err(PolymeshError::UnresolvedResult(_))
        ));
        assert_eq!(queue.status(), TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn test_queue_runs_once() {
        let h = Harness::new();
        let mut queue = queue_of(&h, vec![PreparedEntry::Single(spec(tags::freeze()))]);
        queue.run().await.unwrap();
        let queries = h.chain.query_count();
        assert!(matches!(
            queue.run().await,
            Err(PolymeshError::AlreadyResolved { .. })
        ));
        assert_eq!(h.chain.query_count(), queries);
        assert_eq!(h.submitter.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_fees_and_split() {
        let h = Harness::new();
        h.chain
            .set_protocol_fee(tags::issue(), Balance::from_units(3));
        let batch = PolymeshTransactionBatch::new(
            vec![spec(tags::issue()), spec(tags::issue()).with_fee_multiplier(2)],
            h.ctx.clone(),
        );
        let fees = batch.total_fees().await.unwrap();
        assert_eq!(fees.fees.protocol, Balance::from_units(9));
        assert_eq!(fees.fees.gas, Balance::from_units(2));

        let mut parts = batch.split().unwrap();
        assert_eq!(parts.len(), 2);
        for tx in &mut parts {
            tx.run().await.unwrap();
        }
        assert_eq!(h.submitter.submitted().len(), 2);

        let mut settled =
            PolymeshTransactionBatch::new(vec![spec(tags::issue()), spec(tags::issue())], h.ctx.clone());
        settled.run().await.unwrap();
        assert!(settled.split().is_err());
    }
}
