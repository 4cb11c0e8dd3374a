use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{AssetDetails, Context};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::procedures::existing_asset;
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, Balance, Role, Ticker, MAX_BALANCE};

/// Arguments of [`IssueTokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTokensArgs {
    /// The asset.
    pub ticker: Ticker,
    /// Amount to mint into the owner's default portfolio.
    pub amount: Balance,
}

/// Checks that `amount` can be issued for an asset with `divisible` and
/// `total_supply`, returning the new total supply.
pub(crate) fn check_issuance(
    ticker: &Ticker,
    divisible: bool,
    total_supply: Balance,
    amount: Balance,
) -> PolymeshResult<Balance> {
    if amount.is_zero() {
        return Err(PolymeshError::invalid_argument(
            "the amount to issue must be greater than zero",
        ));
    }
    if !divisible && !amount.is_whole() {
        return Err(PolymeshError::invalid_argument(format!(
            "the asset {ticker} is indivisible, so only whole amounts can be issued"
        )));
    }
    match total_supply.checked_add(amount) {
        Some(supply) if supply <= MAX_BALANCE => Ok(supply),
        _ => Err(PolymeshError::invalid_argument(format!(
            "issuing {amount} would exceed the maximum supply of {MAX_BALANCE} for {ticker}"
        ))),
    }
}

/// Mints tokens of an asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueTokens;

#[async_trait]
impl Procedure for IssueTokens {
    type Args = IssueTokensArgs;
    type Output = Balance;
    type Storage = Option<AssetDetails>;

    fn name(&self) -> &'static str {
        "issueTokens"
    }

    async fn prepare_storage(
        &self,
        args: &IssueTokensArgs,
        ctx: &Context,
    ) -> PolymeshResult<Option<AssetDetails>> {
        ctx.query().asset_details(&args.ticker).await
    }

    async fn authorization(
        &self,
        args: &IssueTokensArgs,
        _ctx: &Context,
        _storage: &Option<AssetDetails>,
    ) -> PolymeshResult<ProcedureAuthorization> {
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions([tags::issue()]).with_assets([args.ticker.clone()]),
        )
        .with_role(Role::TickerOwner {
            ticker: args.ticker.clone(),
        }))
    }

    async fn prepare_transactions(
        &self,
        args: IssueTokensArgs,
        _ctx: &Context,
        asset: &Option<AssetDetails>,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Balance>> {
        let asset = existing_asset(&args.ticker, asset.as_ref())?;
        let supply = check_issuance(
            &args.ticker,
            asset.divisible,
            asset.total_supply,
            args.amount,
        )?;
        let spec = TransactionSpec::new(
            tags::issue(),
            vec![
                serde_json::to_value(&args.ticker)?,
                serde_json::to_value(args.amount)?,
            ],
        );
        Ok(Prepared::new(accumulator.add_transaction(spec), supply))
    }
}
