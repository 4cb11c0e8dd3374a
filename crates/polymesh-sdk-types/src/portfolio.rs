//! Portfolio identifiers.

use crate::id::IdentityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a portfolio: the owner's default portfolio when `number` is
/// `None`, or a numbered portfolio otherwise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortfolioId {
    /// The owning identity.
    pub did: IdentityId,
    /// The portfolio number, `None` for the default portfolio.
    pub number: Option<u64>,
}

impl PortfolioId {
    /// The default portfolio of `did`.
    pub fn default_portfolio(did: IdentityId) -> Self {
        Self { did, number: None }
    }

    /// A numbered portfolio of `did`.
    pub fn numbered(did: IdentityId, number: u64) -> Self {
        Self {
            did,
            number: Some(number),
        }
    }

    /// Returns true for a default portfolio.
    pub fn is_default(&self) -> bool {
        self.number.is_none()
    }
}

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{}/{n}", self.did),
            None => write!(f, "{}/default", self.did),
        }
    }
}

impl fmt::Debug for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortfolioId({self})")
    }
}
