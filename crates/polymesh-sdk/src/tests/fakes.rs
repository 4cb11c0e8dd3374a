//! In-memory chain and scripted submitter.

use crate::chain::{ChainEvent, DispatchError, Extrinsic, Receipt, SubmissionEvent};
use crate::config::PolymeshConfig;
use crate::context::{
    AssetDetails, AssetDocument, ChainQuery, Context, SignerInfo, Submitter, Subsidy,
    TickerStatus,
};
use crate::error::{PolymeshError, PolymeshResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use polymesh_sdk_types::{AccountId, Balance, IdentityId, Role, Ticker, TxTag, H256};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const ALICE: AccountId = AccountId::repeat_byte(0xa1);
pub(crate) const ALICE_DID: IdentityId = IdentityId::repeat_byte(0x0a);
pub(crate) const BOB: AccountId = AccountId::repeat_byte(0xb1);
pub(crate) const BOB_DID: IdentityId = IdentityId::repeat_byte(0x0b);

pub(crate) fn ticker(s: &str) -> Ticker {
    Ticker::new(s).unwrap()
}

#[derive(Default)]
struct ChainState {
    signers: HashMap<AccountId, SignerInfo>,
    roles: HashMap<IdentityId, Vec<Role>>,
    balances: HashMap<AccountId, Balance>,
    subsidies: HashMap<AccountId, Subsidy>,
    protocol_fees: HashMap<TxTag, Balance>,
    identities: HashSet<IdentityId>,
    cdd: HashSet<IdentityId>,
    assets: HashMap<Ticker, AssetDetails>,
    tickers: HashMap<Ticker, TickerStatus>,
    documents: HashMap<Ticker, Vec<AssetDocument>>,
}

/// A [`ChainQuery`] over mutable in-memory state.
///
/// Alice (primary key of an identity with a valid CDD claim) and Bob (same)
/// exist with 1000 POLYX each. Every call costs 1 POLYX of gas and no
/// protocol fee unless configured.
pub(crate) struct FakeChain {
    state: Mutex<ChainState>,
    gas_per_call: Balance,
    queries: AtomicUsize,
}

impl FakeChain {
    pub(crate) fn new() -> Self {
        let chain = Self {
            state: Mutex::new(ChainState::default()),
            gas_per_call: Balance::from_units(1),
            queries: AtomicUsize::new(0),
        };
        for (account, did) in [(ALICE, ALICE_DID), (BOB, BOB_DID)] {
            chain.set_signer(account, SignerInfo::primary(did));
            chain.set_balance(account, Balance::from_units(1000));
            chain.add_identity(did, true);
        }
        chain
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn set_signer(&self, account: AccountId, info: SignerInfo) {
        self.state.lock().unwrap().signers.insert(account, info);
    }

    pub(crate) fn grant_role(&self, did: IdentityId, role: Role) {
        self.state
            .lock()
            .unwrap()
            .roles
            .entry(did)
            .or_default()
            .push(role);
    }

    pub(crate) fn set_balance(&self, account: AccountId, balance: Balance) {
        self.state.lock().unwrap().balances.insert(account, balance);
    }

    pub(crate) fn set_subsidy(&self, account: AccountId, subsidy: Subsidy) {
        self.state.lock().unwrap().subsidies.insert(account, subsidy);
    }

    pub(crate) fn set_protocol_fee(&self, tag: TxTag, fee: Balance) {
        self.state.lock().unwrap().protocol_fees.insert(tag, fee);
    }

    pub(crate) fn add_identity(&self, did: IdentityId, valid_cdd: bool) {
        let mut state = self.state.lock().unwrap();
        state.identities.insert(did);
        if valid_cdd {
            state.cdd.insert(did);
        }
    }

    pub(crate) fn add_asset(&self, details: AssetDetails) {
        let mut state = self.state.lock().unwrap();
        state.tickers.insert(
            details.ticker.clone(),
            TickerStatus::AssetCreated {
                owner: details.owner,
            },
        );
        state.assets.insert(details.ticker.clone(), details);
    }

    pub(crate) fn set_ticker(&self, ticker: Ticker, status: TickerStatus) {
        self.state.lock().unwrap().tickers.insert(ticker, status);
    }

    pub(crate) fn set_documents(&self, ticker: Ticker, documents: Vec<AssetDocument>) {
        self.state.lock().unwrap().documents.insert(ticker, documents);
    }

    fn count(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

/// An asset owned by Alice.
pub(crate) fn alice_asset(symbol: &str) -> AssetDetails {
    AssetDetails {
        ticker: ticker(symbol),
        owner: ALICE_DID,
        total_supply: Balance::from_units(1_000),
        divisible: true,
        frozen: false,
    }
}

#[async_trait]
impl ChainQuery for FakeChain {
    async fn signer_info(&self, account: &AccountId) -> PolymeshResult<SignerInfo> {
        self.count();
        Ok(self
            .state
            .lock()
            .unwrap()
            .signers
            .get(account)
            .cloned()
            .unwrap_or_else(SignerInfo::unattached))
    }

    async fn has_role(&self, did: &IdentityId, role: &Role) -> PolymeshResult<bool> {
        self.count();
        let state = self.state.lock().unwrap();
        let held = match role {
            Role::TickerOwner { ticker } => match state.tickers.get(ticker) {
                Some(TickerStatus::Reserved { owner }) | Some(TickerStatus::AssetCreated { owner }) => {
                    owner == did
                }
                _ => false,
            },
            Role::Identity { did: expected } => expected == did,
            other => state
                .roles
                .get(did)
                .is_some_and(|roles| roles.contains(other)),
        };
        Ok(held)
    }

    async fn free_balance(&self, account: &AccountId) -> PolymeshResult<Balance> {
        self.count();
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(account)
            .copied()
            .unwrap_or(Balance::ZERO))
    }

    async fn subsidy(&self, account: &AccountId) -> PolymeshResult<Option<Subsidy>> {
        self.count();
        Ok(self.state.lock().unwrap().subsidies.get(account).cloned())
    }

    async fn protocol_fee(&self, tag: &TxTag) -> PolymeshResult<Balance> {
        self.count();
        Ok(self
            .state
            .lock()
            .unwrap()
            .protocol_fees
            .get(tag)
            .copied()
            .unwrap_or(Balance::ZERO))
    }

    async fn payment_info(
        &self,
        extrinsic: &Extrinsic,
        _signer: &AccountId,
    ) -> PolymeshResult<Balance> {
        self.count();
        Ok(self.gas_per_call.saturating_mul(extrinsic.calls().len() as u32))
    }

    async fn identity_exists(&self, did: &IdentityId) -> PolymeshResult<bool> {
        self.count();
        Ok(self.state.lock().unwrap().identities.contains(did))
    }

    async fn has_valid_cdd(&self, did: &IdentityId) -> PolymeshResult<bool> {
        self.count();
        Ok(self.state.lock().unwrap().cdd.contains(did))
    }

    async fn asset_details(&self, ticker: &Ticker) -> PolymeshResult<Option<AssetDetails>> {
        self.count();
        Ok(self.state.lock().unwrap().assets.get(ticker).cloned())
    }

    async fn ticker_status(&self, ticker: &Ticker) -> PolymeshResult<TickerStatus> {
        self.count();
        Ok(self
            .state
            .lock()
            .unwrap()
            .tickers
            .get(ticker)
            .copied()
            .unwrap_or(TickerStatus::Available))
    }

    async fn asset_documents(&self, ticker: &Ticker) -> PolymeshResult<Vec<AssetDocument>> {
        self.count();
        Ok(self
            .state
            .lock()
            .unwrap()
            .documents
            .get(ticker)
            .cloned()
            .unwrap_or_default())
    }
}

/// What the submitter does for one submission.
pub(crate) enum Script {
    /// Emit these events, then end the stream.
    Events(Vec<SubmissionEvent>),
    /// Fail `submit` itself.
    SubmitError(String),
}

/// A [`Submitter`] that replays scripted events and records submissions.
///
/// Without a script, a submission is approved, broadcast and finalized
/// successfully with no events.
pub(crate) struct FakeSubmitter {
    scripts: Mutex<VecDeque<Script>>,
    submitted: Mutex<Vec<Extrinsic>>,
}

impl FakeSubmitter {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub(crate) fn submitted(&self) -> Vec<Extrinsic> {
        self.submitted.lock().unwrap().clone()
    }
}

/// A receipt for the `n`-th submission.
pub(crate) fn receipt(n: u8) -> Receipt {
    Receipt {
        tx_hash: H256::repeat_byte(n),
        block_hash: H256::repeat_byte(0xee),
        block_number: u64::from(n),
        tx_index: 0,
        dispatch_error: None,
        events: Vec::new(),
    }
}

/// Approved, broadcast and finalized with `receipt`.
pub(crate) fn finalized(receipt: Receipt) -> Script {
    Script::Events(vec![
        SubmissionEvent::Unapproved,
        SubmissionEvent::Running {
            tx_hash: receipt.tx_hash,
        },
        SubmissionEvent::Finalized(receipt),
    ])
}

/// Finalized successfully, emitting `events`.
pub(crate) fn succeeded_with(n: u8, events: Vec<ChainEvent>) -> Script {
    finalized(Receipt {
        events,
        ..receipt(n)
    })
}

/// Finalized with the runtime rejecting the call.
pub(crate) fn failed_with(n: u8, error: DispatchError) -> Script {
    finalized(Receipt {
        dispatch_error: Some(error),
        ..receipt(n)
    })
}

#[async_trait]
impl Submitter for FakeSubmitter {
    async fn submit(
        &self,
        extrinsic: Extrinsic,
        _signer: &AccountId,
    ) -> PolymeshResult<BoxStream<'static, SubmissionEvent>> {
        let n = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(extrinsic);
            submitted.len() as u8
        };
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| finalized(receipt(n)));
        match script {
            Script::Events(events) => Ok(stream::iter(events).boxed()),
            Script::SubmitError(message) => Err(PolymeshError::Submission(message)),
        }
    }
}

/// A chain, a submitter and a context signing as Alice.
pub(crate) struct Harness {
    pub(crate) chain: Arc<FakeChain>,
    pub(crate) submitter: Arc<FakeSubmitter>,
    pub(crate) ctx: Context,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(PolymeshConfig::local())
    }

    pub(crate) fn with_config(config: PolymeshConfig) -> Self {
        let chain = Arc::new(FakeChain::new());
        let submitter = Arc::new(FakeSubmitter::new());
        let ctx = Context::new(chain.clone(), submitter.clone(), ALICE, config);
        Self {
            chain,
            submitter,
            ctx,
        }
    }
}
