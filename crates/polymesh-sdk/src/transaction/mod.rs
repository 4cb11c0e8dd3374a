//! Monitorable transactions, atomic batches and the queue that runs them.
//!
//! Every transaction object follows the same status machine:
//!
//! ```text
//! Idle -> Unapproved -> Running -> Succeeded | Failed | Aborted | Rejected
//! ```
//!
//! Transitions are driven by the events of the
//! [`Submitter`](crate::context::Submitter) stream. A status only moves
//! forward, and updating a settled transaction fails with `AlreadyResolved`.

mod base;
mod batch;
mod events;
mod failure;
pub mod fees;
mod queue;
mod single;
mod spec;
mod status;

pub use batch::PolymeshTransactionBatch;
pub use events::{StatusUpdate, Subscription};
pub use failure::TransactionError;
pub use fees::{Fees, PayingAccount, PayingAccountFees};
pub use queue::{QueueEntry, QueueFees, TransactionQueue};
pub use single::PolymeshTransaction;
pub use spec::{ReceiptHook, TransactionSpec};
pub use status::TransactionStatus;
