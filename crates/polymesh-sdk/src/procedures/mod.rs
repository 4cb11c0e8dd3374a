//! Asset and identity Procedures built on the engine.
//!
//! Each Procedure is a unit struct; prepare it with
//! [`Procedure::prepare`](crate::procedure::Procedure::prepare) and run the
//! resulting queue.

mod create_asset;
mod issue_tokens;
mod reserve_ticker;
mod set_documents;
mod toggle_freeze;
mod transfer_ownership;
mod transfer_polyx;

use crate::context::AssetDetails;
use crate::error::{PolymeshError, PolymeshResult};
use polymesh_sdk_types::Ticker;

/// The asset read while preparing storage, or `EntityDoesNotExist`.
///
/// Storage keeps the lookup optional so that authorization checks still
/// report on unknown tickers.
pub(crate) fn existing_asset<'a>(
    ticker: &Ticker,
    asset: Option<&'a AssetDetails>,
) -> PolymeshResult<&'a AssetDetails> {
    asset.ok_or_else(|| PolymeshError::not_found(format!("there is no asset with ticker {ticker}")))
}

pub use create_asset::{CreateAsset, CreateAssetArgs, CreateAssetStorage, MAX_ASSET_NAME_LENGTH};
pub use issue_tokens::{IssueTokens, IssueTokensArgs};
pub use reserve_ticker::{ReserveTicker, ReserveTickerArgs, ReserveTickerStorage};
pub use set_documents::{SetAssetDocuments, SetAssetDocumentsArgs, SetAssetDocumentsStorage};
pub use toggle_freeze::{ToggleFreezeArgs, ToggleFreezeAsset};
pub use transfer_ownership::{TransferAssetOwnership, TransferAssetOwnershipArgs};
pub use transfer_polyx::{TransferPolyx, TransferPolyxArgs, TransferPolyxStorage, MAX_MEMO_LENGTH};
