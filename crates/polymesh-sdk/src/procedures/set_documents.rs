use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{AssetDetails, AssetDocument, Context};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::procedures::existing_asset;
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, Role, Ticker};
use std::collections::HashSet;
use url::Url;

/// Arguments of [`SetAssetDocuments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAssetDocumentsArgs {
    /// The asset.
    pub ticker: Ticker,
    /// The full new document list. An empty list removes every document.
    pub documents: Vec<AssetDocument>,
}

/// What [`SetAssetDocuments`] reads before queueing anything.
#[derive(Debug, Clone)]
pub struct SetAssetDocumentsStorage {
    asset: Option<AssetDetails>,
    current: Vec<AssetDocument>,
}

/// Replaces the documents attached to an asset.
///
/// The current documents are removed and the new ones added in one atomic
/// batch. Adding is charged once per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetAssetDocuments;

fn same_documents(current: &[AssetDocument], new: &[AssetDocument]) -> bool {
    current.len() == new.len()
        && current.iter().collect::<HashSet<_>>() == new.iter().collect::<HashSet<_>>()
}

fn validate(documents: &[AssetDocument]) -> PolymeshResult<()> {
    let mut names = HashSet::new();
    for doc in documents {
        if !names.insert(doc.name.as_str()) {
            return Err(PolymeshError::invalid_argument(format!(
                "document name '{}' is used more than once",
                doc.name
            )));
        }
        Url::parse(&doc.uri).map_err(|e| {
            PolymeshError::invalid_argument(format!(
                "document '{}' has an invalid URI: {e}",
                doc.name
            ))
        })?;
    }
    Ok(())
}

#[async_trait]
impl Procedure for SetAssetDocuments {
    type Args = SetAssetDocumentsArgs;
    type Output = Vec<AssetDocument>;
    type Storage = SetAssetDocumentsStorage;

    fn name(&self) -> &'static str {
        "setAssetDocuments"
    }

    async fn prepare_storage(
        &self,
        args: &SetAssetDocumentsArgs,
        ctx: &Context,
    ) -> PolymeshResult<SetAssetDocumentsStorage> {
        let query = ctx.query();
        Ok(SetAssetDocumentsStorage {
            asset: query.asset_details(&args.ticker).await?,
            current: query.asset_documents(&args.ticker).await?,
        })
    }

    async fn authorization(
        &self,
        args: &SetAssetDocumentsArgs,
        _ctx: &Context,
        storage: &SetAssetDocumentsStorage,
    ) -> PolymeshResult<ProcedureAuthorization> {
        let mut calls = Vec::new();
        if !storage.current.is_empty() {
            calls.push(tags::remove_documents());
        }
        if !args.documents.is_empty() {
            calls.push(tags::add_documents());
        }
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions(calls).with_assets([args.ticker.clone()]),
        )
        .with_role(Role::TickerOwner {
            ticker: args.ticker.clone(),
        }))
    }

    async fn prepare_transactions(
        &self,
        args: SetAssetDocumentsArgs,
        _ctx: &Context,
        storage: &SetAssetDocumentsStorage,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Vec<AssetDocument>>> {
        existing_asset(&args.ticker, storage.asset.as_ref())?;
        if same_documents(&storage.current, &args.documents) {
            return Err(PolymeshError::no_data_change(format!(
                "the documents of {} are already the ones provided",
                args.ticker
            )));
        }
        validate(&args.documents)?;

        let ticker = serde_json::to_value(&args.ticker)?;
        let mut calls = Vec::with_capacity(2);
        if !storage.current.is_empty() {
            let names: Vec<&str> = storage.current.iter().map(|d| d.name.as_str()).collect();
            calls.push(TransactionSpec::new(
                tags::remove_documents(),
                vec![serde_json::to_value(names)?, ticker.clone()],
            ));
        }
        if !args.documents.is_empty() {
            let multiplier = u32::try_from(args.documents.len()).map_err(|_| {
                PolymeshError::invalid_argument("too many documents in one request")
            })?;
            calls.push(
                TransactionSpec::new(
                    tags::add_documents(),
                    vec![serde_json::to_value(&args.documents)?, ticker],
                )
                .with_fee_multiplier(multiplier),
            );
        }
        Ok(Prepared::new(accumulator.add_batch(calls)?, args.documents))
    }
}
