//! Fee estimation, subsidy eligibility and affordability checks.
//!
//! A call costs a protocol fee, fixed per call kind and scaled by the
//! [`TransactionSpec`] fee multiplier, plus a gas fee derived from the extrinsic's weight. The
//! fees are paid by the signer, or by a subsidizer when the signer has a
//! subsidy and every call is eligible for one.

use crate::chain::Extrinsic;
use crate::context::Context;
use crate::error::{PolymeshError, PolymeshResult};
use crate::transaction::TransactionSpec;
use polymesh_sdk_types::{AccountId, Balance, TxTag};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Modules whose calls may be paid for by a subsidizer.
const SUBSIDIZABLE_MODULES: &[&str] = &[
    "asset",
    "complianceManager",
    "corporateAction",
    "externalAgents",
    "portfolio",
    "settlement",
    "statistics",
    "sto",
    "checkpoint",
    "capitalDistribution",
    "corporateBallot",
    "nft",
];

/// Individual calls outside [`SUBSIDIZABLE_MODULES`] that may be subsidized.
const SUBSIDIZABLE_CALLS: &[(&str, &str)] = &[("relayer", "acceptPayingKey")];

/// Returns true if a subsidizer may pay for `tag`.
pub fn is_subsidizable(tag: &TxTag) -> bool {
    SUBSIDIZABLE_MODULES.contains(&tag.module())
        || SUBSIDIZABLE_CALLS
            .iter()
            .any(|(module, call)| *module == tag.module() && *call == tag.call())
}

/// Protocol and gas fees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    /// Fixed per-call fee.
    pub protocol: Balance,
    /// Weight-based fee.
    pub gas: Balance,
}

impl Fees {
    /// Protocol plus gas.
    pub fn total(&self) -> Balance {
        self.protocol.saturating_add(self.gas)
    }

    /// Component-wise sum.
    pub fn add(self, other: Fees) -> Fees {
        Fees {
            protocol: self.protocol.saturating_add(other.protocol),
            gas: self.gas.saturating_add(other.gas),
        }
    }
}

/// The account that pays a transaction's fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PayingAccount {
    /// The signer pays.
    Caller {
        /// The signing account.
        account: AccountId,
        /// Its free balance.
        balance: Balance,
    },
    /// A subsidizer pays on the signer's behalf.
    Subsidy {
        /// The subsidizing account.
        account: AccountId,
        /// Its free balance.
        balance: Balance,
        /// What the subsidizer still allows the signer to spend.
        allowance: Balance,
    },
}

impl PayingAccount {
    /// The paying account.
    pub fn account(&self) -> &AccountId {
        match self {
            Self::Caller { account, .. } | Self::Subsidy { account, .. } => account,
        }
    }

    /// The most this account can pay: its balance, capped by the allowance
    /// for a subsidy.
    pub fn available(&self) -> Balance {
        match self {
            Self::Caller { balance, .. } => *balance,
            Self::Subsidy {
                balance, allowance, ..
            } => (*balance).min(*allowance),
        }
    }

    /// Fails with `InsufficientBalance` if this account cannot pay `required`.
    pub fn ensure_covers(&self, required: Balance) -> PolymeshResult<()> {
        let available = self.available();
        if required > available {
            let message = match self {
                Self::Caller { .. } => "the signing account cannot pay the transaction fees",
                Self::Subsidy { .. } => "the subsidy cannot cover the transaction fees",
            };
            return Err(PolymeshError::InsufficientBalance {
                message: message.to_string(),
                required,
                available,
            });
        }
        Ok(())
    }
}

/// Fees of a transaction and who pays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayingAccountFees {
    /// The fees.
    pub fees: Fees,
    /// Who pays them.
    pub paying_account: PayingAccount,
}

impl PayingAccountFees {
    /// Fails with `InsufficientBalance` if the payer cannot cover the fees.
    pub fn ensure_affordable(&self) -> PolymeshResult<()> {
        self.paying_account.ensure_covers(self.fees.total())
    }
}

/// Sums protocol and gas fees over `specs`, each priced as its own call.
pub(crate) async fn estimate(ctx: &Context, specs: &[TransactionSpec]) -> PolymeshResult<Fees> {
    let mut fees = Fees::default();
    for spec in specs {
        let protocol = ctx
            .query()
            .protocol_fee(spec.tag())
            .await?
            .checked_mul(spec.fee_multiplier())
            .ok_or_else(|| {
                PolymeshError::Internal(format!("protocol fee overflow for {}", spec.tag()))
            })?;
        let gas = ctx
            .query()
            .payment_info(&Extrinsic::Call(spec.call_data()), ctx.signing_account())
            .await?;
        fees = fees.add(Fees { protocol, gas });
    }
    debug!(
        calls = specs.len(),
        protocol = %fees.protocol,
        gas = %fees.gas,
        "Fees estimated"
    );
    Ok(fees)
}

/// Resolves who pays: the subsidizer when `supports_subsidy` and the signer
/// has a subsidy, the signer otherwise.
pub(crate) async fn paying_account(
    ctx: &Context,
    supports_subsidy: bool,
) -> PolymeshResult<PayingAccount> {
    let signer = *ctx.signing_account();
    if supports_subsidy {
        if let Some(subsidy) = ctx.query().subsidy(&signer).await? {
            let balance = ctx.query().free_balance(&subsidy.subsidizer).await?;
            return Ok(PayingAccount::Subsidy {
                account: subsidy.subsidizer,
                balance,
                allowance: subsidy.allowance,
            });
        }
    }
    let balance = ctx.query().free_balance(&signer).await?;
    Ok(PayingAccount::Caller {
        account: signer,
        balance,
    })
}

/// Estimates the fees of `specs` and resolves their payer.
pub(crate) async fn total_fees(
    ctx: &Context,
    specs: &[TransactionSpec],
    supports_subsidy: bool,
) -> PolymeshResult<PayingAccountFees> {
    let fees = estimate(ctx, specs).await?;
    let paying_account = paying_account(ctx, supports_subsidy).await?;
    Ok(PayingAccountFees {
        fees,
        paying_account,
    })
}
