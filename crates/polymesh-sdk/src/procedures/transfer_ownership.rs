use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::chain::Receipt;
use crate::context::{AssetDetails, Context};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{MaybePostValue, Prepared, Procedure, TransactionAccumulator};
use crate::procedures::existing_asset;
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, IdentityId, Role, Ticker};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Arguments of [`TransferAssetOwnership`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAssetOwnershipArgs {
    /// The asset.
    pub ticker: Ticker,
    /// The identity asked to become the owner.
    pub target: IdentityId,
    /// When the request lapses, in milliseconds since the Unix epoch.
    pub expiry: Option<u64>,
}

/// Asks another identity to take ownership of an asset.
///
/// Nothing changes hands until the target accepts the authorization request;
/// the result is the id of that request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferAssetOwnership;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn authorization_id(receipt: &Receipt) -> PolymeshResult<u64> {
    receipt.event_field("identity", "AuthorizationAdded", "authId")
}

#[async_trait]
impl Procedure for TransferAssetOwnership {
    type Args = TransferAssetOwnershipArgs;
    type Output = u64;
    type Storage = Option<AssetDetails>;

    fn name(&self) -> &'static str {
        "transferAssetOwnership"
    }

    async fn prepare_storage(
        &self,
        args: &TransferAssetOwnershipArgs,
        ctx: &Context,
    ) -> PolymeshResult<Option<AssetDetails>> {
        ctx.query().asset_details(&args.ticker).await
    }

    async fn authorization(
        &self,
        args: &TransferAssetOwnershipArgs,
        _ctx: &Context,
        _storage: &Option<AssetDetails>,
    ) -> PolymeshResult<ProcedureAuthorization> {
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions([tags::add_authorization()])
                .with_assets([args.ticker.clone()]),
        )
        .with_role(Role::TickerOwner {
            ticker: args.ticker.clone(),
        }))
    }

    async fn prepare_transactions(
        &self,
        args: TransferAssetOwnershipArgs,
        ctx: &Context,
        asset: &Option<AssetDetails>,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<u64>> {
        let asset = existing_asset(&args.ticker, asset.as_ref())?;
        if asset.owner == args.target {
            return Err(PolymeshError::no_data_change(format!(
                "{} already owns {}",
                args.target, args.ticker
            )));
        }
        if !ctx.query().identity_exists(&args.target).await? {
            return Err(PolymeshError::not_found(format!(
                "identity {} does not exist",
                args.target
            )));
        }
        if let Some(expiry) = args.expiry {
            if expiry <= now_millis() {
                return Err(PolymeshError::invalid_argument(
                    "the expiry date must be in the future",
                ));
            }
        }

        let spec = TransactionSpec::new(
            tags::add_authorization(),
            vec![
                json!({ "identity": args.target }),
                json!({ "transferAssetOwnership": args.ticker }),
                args.expiry.map_or(Value::Null, Value::from),
            ],
        );
        let (accumulator, auth_id) =
            accumulator.add_transaction_with_result(spec, authorization_id);
        Ok(Prepared::new(accumulator, MaybePostValue::Pending(auth_id)))
    }
}
