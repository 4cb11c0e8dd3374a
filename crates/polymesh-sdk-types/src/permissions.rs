//! Signing key permissions and identity roles.
//!
//! Secondary keys of an identity carry scoped permissions over assets,
//! portfolios and transactions. Each scope is one of:
//!
//! - [`SectionPermissions::Whole`]: unrestricted, satisfies any requirement;
//! - [`SectionPermissions::Except`]: everything but the listed values;
//! - [`SectionPermissions::These`]: only the listed values.

use crate::id::IdentityId;
use crate::portfolio::PortfolioId;
use crate::ticker::Ticker;
use crate::tx_tag::TxTag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A permission scope over values of type `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "camelCase")]
pub enum SectionPermissions<T> {
    /// No restriction.
    Whole,
    /// Only the listed values are allowed.
    These(Vec<T>),
    /// Everything except the listed values is allowed.
    Except(Vec<T>),
}

impl<T> Default for SectionPermissions<T> {
    fn default() -> Self {
        Self::Whole
    }
}

impl<T> SectionPermissions<T> {
    /// Returns true if the scope grants `value`, using `matches` to compare a
    /// listed entry with the requested value.
    pub fn allows_with<V: ?Sized>(&self, value: &V, matches: impl Fn(&T, &V) -> bool) -> bool {
        match self {
            Self::Whole => true,
            Self::These(values) => values.iter().any(|v| matches(v, value)),
            Self::Except(values) => !values.iter().any(|v| matches(v, value)),
        }
    }

    /// Returns true if the scope places no restriction at all.
    pub fn is_whole(&self) -> bool {
        matches!(self, Self::Whole)
    }
}

impl<T: PartialEq> SectionPermissions<T> {
    /// Returns true if the scope grants `value`.
    pub fn allows(&self, value: &T) -> bool {
        self.allows_with(value, |a, b| a == b)
    }
}

/// An entry of a transaction permission scope: a single call or a whole module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxMatcher {
    /// Exactly this call.
    Tag(TxTag),
    /// Every call of this module.
    Module(String),
}

impl TxMatcher {
    /// Returns true if `tag` falls under this entry.
    pub fn matches(&self, tag: &TxTag) -> bool {
        match self {
            Self::Tag(t) => t == tag,
            Self::Module(module) => module == tag.module(),
        }
    }
}

/// The permissions of a signing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// Assets the key may act upon.
    pub assets: SectionPermissions<Ticker>,
    /// Portfolios the key may act upon.
    pub portfolios: SectionPermissions<PortfolioId>,
    /// Calls the key may sign.
    pub transactions: SectionPermissions<TxMatcher>,
}

impl Permissions {
    /// Unrestricted permissions, as held by a primary key.
    pub fn full() -> Self {
        Self::default()
    }

    /// Returns true if the key may act upon `ticker`.
    pub fn allows_asset(&self, ticker: &Ticker) -> bool {
        self.assets.allows(ticker)
    }

    /// Returns true if the key may act upon `portfolio`.
    pub fn allows_portfolio(&self, portfolio: &PortfolioId) -> bool {
        self.portfolios.allows(portfolio)
    }

    /// Returns true if the key may sign `tag`.
    pub fn allows_transaction(&self, tag: &TxTag) -> bool {
        self.transactions.allows_with(tag, TxMatcher::matches)
    }
}

/// A role an identity can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Role {
    /// Owner of a ticker reservation or asset.
    TickerOwner {
        /// The ticker.
        ticker: Ticker,
    },
    /// A trusted customer due diligence provider.
    CddProvider,
    /// Owner of a settlement venue.
    VenueOwner {
        /// The venue number.
        venue_id: u64,
    },
    /// Custodian of a portfolio.
    PortfolioCustodian {
        /// The portfolio.
        portfolio_id: PortfolioId,
    },
    /// Being a specific identity.
    Identity {
        /// The identity.
        did: IdentityId,
    },
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::TickerOwner { ticker } => write!(f, "owner of ticker {ticker}"),
            Role::CddProvider => f.write_str("CDD provider"),
            Role::VenueOwner { venue_id } => write!(f, "owner of venue {venue_id}"),
            Role::PortfolioCustodian { portfolio_id } => {
                write!(f, "custodian of portfolio {portfolio_id}")
            }
            Role::Identity { did } => write!(f, "identity {did}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    #[test]
    fn test_whole_allows_everything() {
        let p: SectionPermissions<Ticker> = SectionPermissions::Whole;
        assert!(p.allows(&ticker("ANY")));
    }

    #[test]
    fn test_these_allows_only_listed() {
        let p = SectionPermissions::These(vec![ticker("ACME")]);
        assert!(p.allows(&ticker("ACME")));
        assert!(!p.allows(&ticker("OTHER")));
    }

    #[test]
    fn test_except_denies_only_listed() {
        let p = SectionPermissions::Except(vec![ticker("ACME")]);
        assert!(!p.allows(&ticker("ACME")));
        assert!(p.allows(&ticker("OTHER")));
    }

    #[test]
    fn test_transaction_module_matching() {
        let permissions = Permissions {
            transactions: SectionPermissions::Except(vec![TxMatcher::Module("asset".into())]),
            ..Permissions::default()
        };
        assert!(!permissions.allows_transaction(&"asset.freeze".parse().unwrap()));
        assert!(permissions.allows_transaction(&"identity.addAuthorization".parse().unwrap()));

        let permissions = Permissions {
            transactions: SectionPermissions::These(vec![TxMatcher::Tag(
                "asset.freeze".parse().unwrap(),
            )]),
            ..Permissions::default()
        };
        assert!(permissions.allows_transaction(&"asset.freeze".parse().unwrap()));
        assert!(!permissions.allows_transaction(&"asset.unfreeze".parse().unwrap()));
    }

    #[test]
    fn test_role_display() {
        let role = Role::TickerOwner {
            ticker: ticker("ACME"),
        };
        assert_eq!(role.to_string(), "owner of ticker ACME");
    }
}
