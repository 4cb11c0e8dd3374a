use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{Context, TickerStatus};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, IdentityId, Ticker};

/// Arguments of [`ReserveTicker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveTickerArgs {
    /// The ticker to reserve.
    pub ticker: Ticker,
}

/// What [`ReserveTicker`] reads before queueing anything.
#[derive(Debug, Clone)]
pub struct ReserveTickerStorage {
    status: TickerStatus,
    signer: Option<IdentityId>,
}

/// Reserves a ticker for the signing identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReserveTicker;

#[async_trait]
impl Procedure for ReserveTicker {
    type Args = ReserveTickerArgs;
    type Output = Ticker;
    type Storage = ReserveTickerStorage;

    fn name(&self) -> &'static str {
        "reserveTicker"
    }

    async fn prepare_storage(
        &self,
        args: &ReserveTickerArgs,
        ctx: &Context,
    ) -> PolymeshResult<ReserveTickerStorage> {
        Ok(ReserveTickerStorage {
            status: ctx.query().ticker_status(&args.ticker).await?,
            signer: ctx.signing_identity().await?,
        })
    }

    async fn authorization(
        &self,
        _args: &ReserveTickerArgs,
        _ctx: &Context,
        _storage: &ReserveTickerStorage,
    ) -> PolymeshResult<ProcedureAuthorization> {
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions([tags::register_ticker()]),
        ))
    }

    async fn prepare_transactions(
        &self,
        args: ReserveTickerArgs,
        _ctx: &Context,
        storage: &ReserveTickerStorage,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Ticker>> {
        match storage.status {
            TickerStatus::Available => {}
            TickerStatus::Reserved { owner } if Some(owner) == storage.signer => {
                return Err(PolymeshError::no_data_change(format!(
                    "ticker {} is already reserved by the signing identity",
                    args.ticker
                )));
            }
            TickerStatus::Reserved { .. } => {
                return Err(PolymeshError::invalid_argument(format!(
                    "ticker {} is reserved by another identity",
                    args.ticker
                )));
            }
            TickerStatus::AssetCreated { .. } => {
                return Err(PolymeshError::invalid_argument(format!(
                    "an asset with ticker {} already exists",
                    args.ticker
                )));
            }
        }

        let spec = TransactionSpec::with_args(tags::register_ticker(), &[&args.ticker])?;
        Ok(Prepared::new(accumulator.add_transaction(spec), args.ticker))
    }
}
