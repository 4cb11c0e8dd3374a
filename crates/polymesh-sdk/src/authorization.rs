//! Authorization requirements of Procedures and their evaluation against the
//! signing key.
//!
//! Evaluation is a pure function over a [`SignerSnapshot`]. The snapshot is
//! gathered once per check with read-only queries, so the same requirement can
//! be evaluated without touching the chain again.
//!
//! Rules:
//!
//! - a primary key satisfies every permission requirement;
//! - a secondary key is checked scope by scope, where `Whole` grants anything,
//!   `Except` grants anything not listed and `These` grants only what is listed;
//! - roles are checked independently of permissions and all must be held;
//! - a key without an identity, or a secondary key whose identity froze its
//!   secondary keys, is never authorized for requirements that need an identity.

use crate::context::Context;
use crate::error::PolymeshResult;
use polymesh_sdk_types::{AccountId, IdentityId, Permissions, PortfolioId, Role, Ticker, TxTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Key permissions a Procedure needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePermissions {
    /// Assets the key must be allowed to act upon.
    pub assets: Vec<Ticker>,
    /// Portfolios the key must be allowed to act upon.
    pub portfolios: Vec<PortfolioId>,
    /// Calls the key must be allowed to sign.
    pub transactions: Vec<TxTag>,
}

impl SimplePermissions {
    /// Requires signing `transactions` only.
    pub fn transactions(transactions: impl IntoIterator<Item = TxTag>) -> Self {
        Self {
            transactions: transactions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Also requires acting upon `assets`.
    pub fn with_assets(mut self, assets: impl IntoIterator<Item = Ticker>) -> Self {
        self.assets.extend(assets);
        self
    }

    /// Also requires acting upon `portfolios`.
    pub fn with_portfolios(mut self, portfolios: impl IntoIterator<Item = PortfolioId>) -> Self {
        self.portfolios.extend(portfolios);
        self
    }

    fn merge(mut self, other: Self) -> Self {
        extend_unique(&mut self.assets, other.assets);
        extend_unique(&mut self.portfolios, other.portfolios);
        extend_unique(&mut self.transactions, other.transactions);
        self
    }
}

/// What a Procedure requires of the signer.
///
/// Requirements with no permissions and no roles can be met by any key, even
/// one without an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureAuthorization {
    /// Key permissions, if any are needed.
    pub permissions: Option<SimplePermissions>,
    /// Roles the signing identity must hold.
    pub roles: Vec<Role>,
}

impl ProcedureAuthorization {
    /// No requirements.
    pub fn none() -> Self {
        Self::default()
    }

    /// Requires `permissions`.
    pub fn permissions(permissions: SimplePermissions) -> Self {
        Self {
            permissions: Some(permissions),
            roles: Vec::new(),
        }
    }

    /// Also requires `role`.
    pub fn with_role(mut self, role: Role) -> Self {
        extend_unique(&mut self.roles, [role]);
        self
    }

    /// The union of both requirements, as needed by a Procedure that runs
    /// another one.
    pub fn merge(self, other: Self) -> Self {
        let permissions = match (self.permissions, other.permissions) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, b) => a.or(b),
        };
        let mut roles = self.roles;
        extend_unique(&mut roles, other.roles);
        Self { permissions, roles }
    }

    fn needs_identity(&self) -> bool {
        self.permissions.is_some() || !self.roles.is_empty()
    }
}

/// The outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStatus {
    /// True if every requirement is met.
    pub authorized: bool,
    /// Assets the key may not act upon.
    pub missing_asset_permissions: Vec<Ticker>,
    /// Portfolios the key may not act upon.
    pub missing_portfolio_permissions: Vec<PortfolioId>,
    /// Calls the key may not sign.
    pub missing_transaction_permissions: Vec<TxTag>,
    /// Roles the identity does not hold.
    pub missing_roles: Vec<Role>,
    /// The key is not attached to an identity.
    pub no_identity: bool,
    /// The key is a secondary key of an identity that froze its secondary keys.
    pub account_frozen: bool,
}

impl AuthorizationStatus {
    /// An authorized status with nothing missing.
    pub fn authorized() -> Self {
        Self {
            authorized: true,
            missing_asset_permissions: Vec::new(),
            missing_portfolio_permissions: Vec::new(),
            missing_transaction_permissions: Vec::new(),
            missing_roles: Vec::new(),
            no_identity: false,
            account_frozen: false,
        }
    }

    /// Combines two statuses: authorized only if both are, with every missing
    /// item of either.
    pub fn merge(mut self, other: Self) -> Self {
        self.authorized &= other.authorized;
        extend_unique(
            &mut self.missing_asset_permissions,
            other.missing_asset_permissions,
        );
        extend_unique(
            &mut self.missing_portfolio_permissions,
            other.missing_portfolio_permissions,
        );
        extend_unique(
            &mut self.missing_transaction_permissions,
            other.missing_transaction_permissions,
        );
        extend_unique(&mut self.missing_roles, other.missing_roles);
        self.no_identity |= other.no_identity;
        self.account_frozen |= other.account_frozen;
        self
    }

    fn recompute(mut self) -> Self {
        self.authorized = self.missing_asset_permissions.is_empty()
            && self.missing_portfolio_permissions.is_empty()
            && self.missing_transaction_permissions.is_empty()
            && self.missing_roles.is_empty()
            && !self.no_identity
            && !self.account_frozen;
        self
    }
}

impl Default for AuthorizationStatus {
    fn default() -> Self {
        Self::authorized()
    }
}

fn push_list<T: fmt::Display>(parts: &mut Vec<String>, label: &str, items: &[T]) {
    if !items.is_empty() {
        let list: Vec<String> = items.iter().map(ToString::to_string).collect();
        parts.push(format!("{label} [{}]", list.join(", ")));
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.authorized {
            return f.write_str("authorized");
        }
        let mut parts = Vec::new();
        if self.no_identity {
            parts.push("signing account has no identity".to_string());
        }
        if self.account_frozen {
            parts.push("signing account is frozen".to_string());
        }
        push_list(&mut parts, "missing roles", &self.missing_roles);
        push_list(
            &mut parts,
            "missing asset permissions",
            &self.missing_asset_permissions,
        );
        push_list(
            &mut parts,
            "missing portfolio permissions",
            &self.missing_portfolio_permissions,
        );
        push_list(
            &mut parts,
            "missing transaction permissions",
            &self.missing_transaction_permissions,
        );
        f.write_str(&parts.join("; "))
    }
}

/// The signing key's state, as relevant to authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSnapshot {
    /// The signing account.
    pub account: AccountId,
    /// The identity the key belongs to.
    pub identity: Option<IdentityId>,
    /// True for a primary key.
    pub is_primary: bool,
    /// True if the identity froze its secondary keys.
    pub frozen: bool,
    /// The key's permissions.
    pub permissions: Permissions,
    /// Roles held, among those that were asked about.
    pub roles: Vec<Role>,
}

impl SignerSnapshot {
    /// Queries the signer's state, checking only the `roles` of interest.
    pub async fn gather(ctx: &Context, roles: &[Role]) -> PolymeshResult<Self> {
        let account = *ctx.signing_account();
        let info = ctx.query().signer_info(&account).await?;

        let mut held = Vec::new();
        if let Some(did) = &info.identity {
            for role in roles {
                if ctx.query().has_role(did, role).await? {
                    held.push(role.clone());
                }
            }
        }

        Ok(Self {
            account,
            identity: info.identity,
            is_primary: info.is_primary,
            frozen: info.frozen,
            permissions: info.permissions,
            roles: held,
        })
    }
}

/// Evaluates `required` against `signer`.
pub fn evaluate(required: &ProcedureAuthorization, signer: &SignerSnapshot) -> AuthorizationStatus {
    let mut status = AuthorizationStatus::authorized();

    if required.needs_identity() && signer.identity.is_none() {
        status.no_identity = true;
    }
    if required.needs_identity() && !signer.is_primary && signer.frozen {
        status.account_frozen = true;
    }

    status.missing_roles = required
        .roles
        .iter()
        .filter(|role| !signer.roles.contains(role))
        .cloned()
        .collect();

    if let Some(permissions) = &required.permissions {
        if !signer.is_primary {
            let held = &signer.permissions;
            status.missing_asset_permissions = permissions
                .assets
                .iter()
                .filter(|t| !held.allows_asset(t))
                .cloned()
                .collect();
            status.missing_portfolio_permissions = permissions
                .portfolios
                .iter()
                .filter(|p| !held.allows_portfolio(p))
                .copied()
                .collect();
            status.missing_transaction_permissions = permissions
                .transactions
                .iter()
                .filter(|t| !held.allows_transaction(t))
                .cloned()
                .collect();
        }
    }

    status.recompute()
}

/// Gathers the signer's state and evaluates `required` against it.
pub async fn check(ctx: &Context, required: &ProcedureAuthorization) -> PolymeshResult<AuthorizationStatus> {
    let signer = SignerSnapshot::gather(ctx, &required.roles).await?;
    let status = evaluate(required, &signer);
    debug!(
        signer = %signer.account,
        authorized = status.authorized,
        "Authorization checked"
    );
    Ok(status)
}

fn extend_unique<T: PartialEq>(into: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
