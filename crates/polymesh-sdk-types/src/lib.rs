//! # Polymesh SDK types
//!
//! Domain primitives shared by the Polymesh SDK crates: identifiers, tickers,
//! balances, transaction tags, portfolios, permissions and roles.
//!
//! These types validate on construction, so a value that exists is always
//! well-formed.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod balance;
pub mod error;
pub mod id;
pub mod permissions;
pub mod portfolio;
pub mod ticker;
pub mod tx_tag;

pub use balance::{Balance, MAX_BALANCE};
pub use error::{TypeError, TypeResult};
pub use id::{AccountId, IdentityId, H256};
pub use permissions::{Permissions, Role, SectionPermissions, TxMatcher};
pub use portfolio::PortfolioId;
pub use ticker::Ticker;
pub use tx_tag::{tags, TxTag};
