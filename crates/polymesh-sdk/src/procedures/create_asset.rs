use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{Context, TickerStatus};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::procedures::issue_tokens::check_issuance;
use crate::procedures::reserve_ticker::{ReserveTicker, ReserveTickerArgs};
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, Balance, IdentityId, Role, Ticker};
use serde_json::json;

/// Longest accepted asset name, in bytes.
pub const MAX_ASSET_NAME_LENGTH: usize = 64;

/// Arguments of [`CreateAsset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssetArgs {
    /// Ticker of the new asset. Reserved first if still available.
    pub ticker: Ticker,
    /// Human-readable name.
    pub name: String,
    /// Whether fractional amounts are allowed.
    pub divisible: bool,
    /// Amount issued to the creator right after creation.
    pub initial_supply: Option<Balance>,
}

/// What [`CreateAsset`] reads before queueing anything.
#[derive(Debug, Clone)]
pub struct CreateAssetStorage {
    status: TickerStatus,
    signer: Option<IdentityId>,
}

/// Creates an asset, reserving its ticker and issuing an initial supply when
/// asked to.
///
/// Creation and issuance are submitted as one atomic batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateAsset;

#[async_trait]
impl Procedure for CreateAsset {
    type Args = CreateAssetArgs;
    type Output = Ticker;
    type Storage = CreateAssetStorage;

    fn name(&self) -> &'static str {
        "createAsset"
    }

    async fn prepare_storage(
        &self,
        args: &CreateAssetArgs,
        ctx: &Context,
    ) -> PolymeshResult<CreateAssetStorage> {
        Ok(CreateAssetStorage {
            status: ctx.query().ticker_status(&args.ticker).await?,
            signer: ctx.signing_identity().await?,
        })
    }

    async fn authorization(
        &self,
        args: &CreateAssetArgs,
        ctx: &Context,
        storage: &CreateAssetStorage,
    ) -> PolymeshResult<ProcedureAuthorization> {
        let mut calls = vec![tags::create_asset()];
        if args.initial_supply.is_some() {
            calls.push(tags::issue());
        }
        let mut required = ProcedureAuthorization::permissions(SimplePermissions::transactions(calls));

        match storage.status {
            TickerStatus::Available => {
                let reserve = ReserveTickerArgs {
                    ticker: args.ticker.clone(),
                };
                let reserve_storage = ReserveTicker.prepare_storage(&reserve, ctx).await?;
                let nested = ReserveTicker
                    .authorization(&reserve, ctx, &reserve_storage)
                    .await?;
                required = required.merge(nested);
            }
            TickerStatus::Reserved { .. } => {
                required = required.with_role(Role::TickerOwner {
                    ticker: args.ticker.clone(),
                });
            }
            TickerStatus::AssetCreated { .. } => {}
        }
        Ok(required)
    }

    async fn prepare_transactions(
        &self,
        args: CreateAssetArgs,
        ctx: &Context,
        storage: &CreateAssetStorage,
        mut accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Ticker>> {
        match storage.status {
            TickerStatus::AssetCreated { .. } => {
                return Err(PolymeshError::invalid_argument(format!(
                    "an asset with ticker {} already exists",
                    args.ticker
                )));
            }
            TickerStatus::Reserved { owner } if Some(owner) != storage.signer => {
                return Err(PolymeshError::invalid_argument(format!(
                    "ticker {} is reserved by another identity",
                    args.ticker
                )));
            }
            TickerStatus::Reserved { .. } | TickerStatus::Available => {}
        }

        let name = args.name.trim();
        if name.is_empty() {
            return Err(PolymeshError::invalid_argument("the asset name must not be empty"));
        }
        if name.len() > MAX_ASSET_NAME_LENGTH {
            return Err(PolymeshError::invalid_argument(format!(
                "the asset name must be at most {MAX_ASSET_NAME_LENGTH} bytes long"
            )));
        }

        let issue = match args.initial_supply {
            Some(amount) => {
                check_issuance(&args.ticker, args.divisible, Balance::ZERO, amount)?;
                Some(TransactionSpec::new(
                    tags::issue(),
                    vec![
                        serde_json::to_value(&args.ticker)?,
                        serde_json::to_value(amount)?,
                    ],
                ))
            }
            None => None,
        };

        if storage.status == TickerStatus::Available {
            let reserve = ReserveTickerArgs {
                ticker: args.ticker.clone(),
            };
            (accumulator, _) = accumulator
                .add_procedure(&ReserveTicker, reserve, ctx)
                .await?;
        }

        let create = TransactionSpec::new(
            tags::create_asset(),
            vec![
                json!(name),
                serde_json::to_value(&args.ticker)?,
                json!(args.divisible),
            ],
        );
        let calls: Vec<TransactionSpec> = std::iter::once(create).chain(issue).collect();
        Ok(Prepared::new(accumulator.add_batch(calls)?, args.ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SignerInfo;
    use crate::tests::fakes::{alice_asset, ticker, Harness, ALICE, ALICE_DID, BOB_DID};
    use crate::transaction::{QueueEntry, TransactionStatus};
    use polymesh_sdk_types::{Permissions, SectionPermissions, TxMatcher};

    fn args(symbol: &str, initial_supply: Option<Balance>) -> CreateAssetArgs {
        CreateAssetArgs {
            ticker: ticker(symbol),
            name: "Acme Corp".to_string(),
            divisible: false,
            initial_supply,
        }
    }

    #[tokio::test]
    async fn test_available_ticker_is_reserved_first() {
        let h = Harness::new();
        let mut queue = CreateAsset
            .prepare(args("ACME", Some(Balance::from_units(100))), &h.ctx)
            .await
            .unwrap();

        assert_eq!(queue.len(), 2);
        match &queue.transactions()[0] {
            QueueEntry::Single(tx) => assert_eq!(tx.tag(), &tags::register_ticker()),
            other => panic!("unexpected entry {other:?}"),
        }
        match &queue.transactions()[1] {
            QueueEntry::Batch(batch) => {
                assert_eq!(batch.tags(), vec![tags::create_asset(), tags::issue()])
            }
            other => panic!("unexpected entry {other:?}"),
        }
        assert!(queue.authorization().authorized);

        assert_eq!(queue.run().await.unwrap(), ticker("ACME"));
        assert_eq!(queue.status(), TransactionStatus::Succeeded);
        assert_eq!(h.submitter.submitted().len(), 2);
    }

    #[tokio::test]
    async fn test_reserved_ticker_creates_directly() {
        let h = Harness::new();
        h.chain
            .set_ticker(ticker("ACME"), TickerStatus::Reserved { owner: ALICE_DID });

        let queue = CreateAsset.prepare(args("ACME", None), &h.ctx).await.unwrap();
        assert_eq!(queue.len(), 1);
        match &queue.transactions()[0] {
            QueueEntry::Single(tx) => {
                assert_eq!(tx.tag(), &tags::create_asset());
                assert_eq!(tx.spec().args()[0], json!("Acme Corp"));
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_taken_tickers() {
        let h = Harness::new();
        h.chain
            .set_ticker(ticker("THEIRS"), TickerStatus::Reserved { owner: BOB_DID });
        h.chain.add_asset(alice_asset("ACME"));

        let err = CreateAsset
            .prepare(args("THEIRS", None), &h.ctx)
            .await
            .unwrap_err();
        let status = match err {
            PolymeshError::UnmetAuthorizations(status) => status,
            other => panic!("expected UnmetAuthorizations, got {other:?}"),
        };
        assert_eq!(
            status.missing_roles,
            vec![Role::TickerOwner {
                ticker: ticker("THEIRS")
            }]
        );

        assert!(matches!(
            CreateAsset.prepare(args("ACME", None), &h.ctx).await,
            Err(PolymeshError::InvalidArgument(_))
        ));
        assert!(h.submitter.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_indivisible_fractional_supply_is_rejected() {
        let h = Harness::new();
        let err = CreateAsset
            .prepare(args("ACME", Some(Balance::from_base_units(1_500_000))), &h.ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, PolymeshError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_reservation_permission_required_when_available() {
        let h = Harness::new();
        h.chain.set_signer(
            ALICE,
            SignerInfo::secondary(
                ALICE_DID,
                Permissions {
                    transactions: SectionPermissions::These(vec![TxMatcher::Tag(
                        tags::create_asset(),
                    )]),
                    ..Permissions::full()
                },
            ),
        );

        let err = CreateAsset
            .prepare(args("ACME", None), &h.ctx)
            .await
            .unwrap_err();
        let status = match err {
            PolymeshError::UnmetAuthorizations(status) => status,
            other => panic!("expected UnmetAuthorizations, got {other:?}"),
        };
        assert_eq!(
            status.missing_transaction_permissions,
            vec![tags::register_ticker()]
        );

        h.chain
            .set_ticker(ticker("ACME"), TickerStatus::Reserved { owner: ALICE_DID });
        assert!(CreateAsset.prepare(args("ACME", None), &h.ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_authorization_aggregates_nested_requirements() {
        let h = Harness::new();
        h.chain.set_signer(
            ALICE,
            SignerInfo::secondary(
                ALICE_DID,
                Permissions {
                    transactions: SectionPermissions::These(vec![]),
                    ..Permissions::full()
                },
            ),
        );

        let status = CreateAsset
            .check_authorization(&args("ACME", Some(Balance::from_units(1))), &h.ctx)
            .await
            .unwrap();
        assert!(!status.authorized);
        assert_eq!(
            status.missing_transaction_permissions,
            vec![tags::create_asset(), tags::issue(), tags::register_ticker()]
        );
    }

    #[tokio::test]
    async fn test_empty_name() {
        let h = Harness::new();
        let err = CreateAsset
            .prepare(
                CreateAssetArgs {
                    name: "  ".to_string(),
                    ..args("ACME", None)
                },
                &h.ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PolymeshError::InvalidArgument(_)));
    }
}
