use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{AssetDetails, Context};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::procedures::existing_asset;
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, Role, Ticker, TxTag};

/// Arguments of [`ToggleFreezeAsset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleFreezeArgs {
    /// The asset.
    pub ticker: Ticker,
    /// `true` to freeze transfers, `false` to unfreeze them.
    pub freeze: bool,
}

/// Freezes or unfreezes transfers of an asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleFreezeAsset;

fn tag_for(freeze: bool) -> TxTag {
    if freeze {
        tags::freeze()
    } else {
        tags::unfreeze()
    }
}

#[async_trait]
impl Procedure for ToggleFreezeAsset {
    type Args = ToggleFreezeArgs;
    type Output = Ticker;
    type Storage = Option<AssetDetails>;

    fn name(&self) -> &'static str {
        "toggleFreezeAsset"
    }

    async fn prepare_storage(
        &self,
        args: &ToggleFreezeArgs,
        ctx: &Context,
    ) -> PolymeshResult<Option<AssetDetails>> {
        ctx.query().asset_details(&args.ticker).await
    }

    async fn authorization(
        &self,
        args: &ToggleFreezeArgs,
        _ctx: &Context,
        _storage: &Option<AssetDetails>,
    ) -> PolymeshResult<ProcedureAuthorization> {
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions([tag_for(args.freeze)])
                .with_assets([args.ticker.clone()]),
        )
        .with_role(Role::TickerOwner {
            ticker: args.ticker.clone(),
        }))
    }

    async fn prepare_transactions(
        &self,
        args: ToggleFreezeArgs,
        _ctx: &Context,
        asset: &Option<AssetDetails>,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Ticker>> {
        let asset = existing_asset(&args.ticker, asset.as_ref())?;
        if asset.frozen == args.freeze {
            let state = if args.freeze { "already frozen" } else { "not frozen" };
            return Err(PolymeshError::no_data_change(format!(
                "the asset {} is {state}",
                args.ticker
            )));
        }

        let spec = TransactionSpec::with_args(tag_for(args.freeze), &[&args.ticker])?;
        Ok(Prepared::new(accumulator.add_transaction(spec), args.ticker))
    }
}
