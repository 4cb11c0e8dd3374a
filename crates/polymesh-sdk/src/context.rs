//! The collaborators the engine runs against.
//!
//! A [`Context`] bundles a read-only [`ChainQuery`], a [`Submitter`] that signs
//! and broadcasts extrinsics, the signing account and the SDK configuration.
//! The engine never mutates any of them; all chain-state changes happen through
//! submitted extrinsics.

use crate::chain::{Extrinsic, SubmissionEvent};
use crate::config::PolymeshConfig;
use crate::error::PolymeshResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use polymesh_sdk_types::{
    AccountId, Balance, IdentityId, Permissions, Role, Ticker, TxTag,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What the chain knows about a signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// The identity the key belongs to, if any.
    pub identity: Option<IdentityId>,
    /// True for the identity's primary key.
    pub is_primary: bool,
    /// True if the identity has frozen its secondary keys.
    pub frozen: bool,
    /// The key's permissions. Primary keys hold full permissions.
    pub permissions: Permissions,
}

impl SignerInfo {
    /// A primary key of `did`.
    pub fn primary(did: IdentityId) -> Self {
        Self {
            identity: Some(did),
            is_primary: true,
            frozen: false,
            permissions: Permissions::full(),
        }
    }

    /// A secondary key of `did` with `permissions`.
    pub fn secondary(did: IdentityId, permissions: Permissions) -> Self {
        Self {
            identity: Some(did),
            is_primary: false,
            frozen: false,
            permissions,
        }
    }

    /// A key not attached to any identity.
    pub fn unattached() -> Self {
        Self {
            identity: None,
            is_primary: false,
            frozen: false,
            permissions: Permissions::full(),
        }
    }
}

/// A fee subsidy granted to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsidy {
    /// The account paying the fees.
    pub subsidizer: AccountId,
    /// The remaining amount the subsidizer is willing to pay.
    pub allowance: Balance,
}

/// On-chain details of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetails {
    /// The asset's ticker.
    pub ticker: Ticker,
    /// The owning identity.
    pub owner: IdentityId,
    /// Total issued supply.
    pub total_supply: Balance,
    /// Whether fractional amounts are allowed.
    pub divisible: bool,
    /// Whether transfers are frozen.
    pub frozen: bool,
}

/// Registration state of a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TickerStatus {
    /// Free to reserve.
    Available,
    /// Reserved, no asset created yet.
    Reserved {
        /// The reserving identity.
        owner: IdentityId,
    },
    /// An asset with this ticker exists.
    AssetCreated {
        /// The asset owner.
        owner: IdentityId,
    },
}

/// A document attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetDocument {
    /// Unique name within the asset.
    pub name: String,
    /// Where the document lives.
    pub uri: String,
    /// Optional hash of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Read-only chain and middleware queries.
#[async_trait]
pub trait ChainQuery: Send + Sync + 'static {
    /// Identity, key type and permissions of `account`.
    async fn signer_info(&self, account: &AccountId) -> PolymeshResult<SignerInfo>;

    /// Whether `did` holds `role`.
    async fn has_role(&self, did: &IdentityId, role: &Role) -> PolymeshResult<bool>;

    /// Free POLYX balance of `account`.
    async fn free_balance(&self, account: &AccountId) -> PolymeshResult<Balance>;

    /// The subsidy paying the fees of `account`, if any.
    async fn subsidy(&self, account: &AccountId) -> PolymeshResult<Option<Subsidy>>;

    /// The protocol fee charged for one `tag` call.
    async fn protocol_fee(&self, tag: &TxTag) -> PolymeshResult<Balance>;

    /// The weight-based fee `signer` would pay for `extrinsic`.
    async fn payment_info(
        &self,
        extrinsic: &Extrinsic,
        signer: &AccountId,
    ) -> PolymeshResult<Balance>;

    /// Whether `did` is a registered identity.
    async fn identity_exists(&self, did: &IdentityId) -> PolymeshResult<bool>;

    /// Whether `did` holds a valid CDD claim.
    async fn has_valid_cdd(&self, did: &IdentityId) -> PolymeshResult<bool>;

    /// The asset registered under `ticker`, if any.
    async fn asset_details(&self, ticker: &Ticker) -> PolymeshResult<Option<AssetDetails>>;

    /// The registration state of `ticker`.
    async fn ticker_status(&self, ticker: &Ticker) -> PolymeshResult<TickerStatus>;

    /// The documents attached to `ticker`.
    async fn asset_documents(&self, ticker: &Ticker) -> PolymeshResult<Vec<AssetDocument>>;
}

/// Signs and broadcasts extrinsics.
///
/// Implementations drive the signer and the node connection and report
/// progress as a stream of [`SubmissionEvent`]s ending with a terminal event.
/// An implementation could, for example, route transactions through a relayer.
#[async_trait]
pub trait Submitter: Send + Sync + 'static {
    /// Submits `extrinsic` signed by `signer`.
    async fn submit(
        &self,
        extrinsic: Extrinsic,
        signer: &AccountId,
    ) -> PolymeshResult<BoxStream<'static, SubmissionEvent>>;
}

/// Everything a Procedure or transaction needs from the outside world.
#[derive(Clone)]
pub struct Context {
    query: Arc<dyn ChainQuery>,
    submitter: Arc<dyn Submitter>,
    signer: AccountId,
    config: PolymeshConfig,
}

impl Context {
    /// Creates a context signing with `signer`.
    pub fn new(
        query: Arc<dyn ChainQuery>,
        submitter: Arc<dyn Submitter>,
        signer: AccountId,
        config: PolymeshConfig,
    ) -> Self {
        Self {
            query,
            submitter,
            signer,
            config,
        }
    }

    /// Returns a copy of this context signing with `signer`.
    pub fn with_signer(&self, signer: AccountId) -> Self {
        Self {
            signer,
            ..self.clone()
        }
    }

    /// The query interface.
    pub fn query(&self) -> &dyn ChainQuery {
        self.query.as_ref()
    }

    /// The submission interface.
    pub fn submitter(&self) -> &dyn Submitter {
        self.submitter.as_ref()
    }

    /// The SDK configuration.
    pub fn config(&self) -> &PolymeshConfig {
        &self.config
    }

    /// The signing account.
    pub fn signing_account(&self) -> &AccountId {
        &self.signer
    }

    /// The identity of the signing account, if it is attached to one.
    pub async fn signing_identity(&self) -> PolymeshResult<Option<IdentityId>> {
        Ok(self.query.signer_info(&self.signer).await?.identity)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("signer", &self.signer)
            .field("network", &self.config.network())
            .finish_non_exhaustive()
    }
}
