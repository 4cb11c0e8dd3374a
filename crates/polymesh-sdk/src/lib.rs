//! # Polymesh SDK
//!
//! The transaction engine of the Polymesh SDK: validated, composable
//! Procedures that turn domain operations into chain calls, and the
//! transactions, batches and queues that submit those calls and track them to
//! a terminal status.
//!
//! The engine talks to the chain only through the collaborators bundled in a
//! [`Context`]: a read-only [`ChainQuery`] and a [`Submitter`] that signs and
//! broadcasts extrinsics.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use polymesh_sdk::{Context, PolymeshConfig, Procedure};
//! use polymesh_sdk::procedures::{ToggleFreezeArgs, ToggleFreezeAsset};
//!
//! async fn freeze(ctx: &Context, ticker: Ticker) -> polymesh_sdk::PolymeshResult<()> {
//!     let mut queue = ToggleFreezeAsset
//!         .prepare(ToggleFreezeArgs { ticker, freeze: true }, ctx)
//!         .await?;
//!     println!("fees: {}", queue.total_fees().await?.total.total());
//!     queue.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`procedure`] - The Procedure trait and the transaction accumulator
//! - [`procedures`] - Asset and identity Procedures
//! - [`transaction`] - Transactions, batches, queues, fees and statuses
//! - [`authorization`] - Permission and role checks
//! - [`chain`] - Extrinsics, submission events and receipts
//! - [`context`] - The chain collaborators

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod authorization;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod procedure;
pub mod procedures;
pub mod transaction;

pub use authorization::{AuthorizationStatus, ProcedureAuthorization};
pub use config::{Network, PolymeshConfig};
pub use context::{ChainQuery, Context, Submitter};
pub use error::{PolymeshError, PolymeshResult};
pub use procedure::{MaybePostValue, Procedure, TransactionAccumulator};
pub use transaction::{
    PolymeshTransaction, PolymeshTransactionBatch, TransactionError, TransactionQueue,
    TransactionStatus,
};

pub use polymesh_sdk_types as types;

#[cfg(test)]
mod tests;
