//! Validated, composable units of business logic.
//!
//! A [`Procedure`] turns domain arguments into chain calls without submitting
//! anything. Preparing one runs, in order:
//!
//! 1. [`Procedure::prepare_storage`]: read-only queries shared by later steps;
//! 2. [`Procedure::authorization`]: what the signer must be allowed to do;
//! 3. the authorization check, which fails with `UnmetAuthorizations` before
//!    any transaction is built;
//! 4. [`Procedure::prepare_transactions`]: precondition checks and the calls
//!    themselves, queued into a [`TransactionAccumulator`].
//!
//! Any failure aborts preparation; no partial queue is ever returned.

mod accumulator;

pub use accumulator::{MaybePostValue, PostTransactionValue, TransactionAccumulator};
pub(crate) use accumulator::PreparedEntry;

use crate::authorization::{self, AuthorizationStatus, ProcedureAuthorization};
use crate::context::Context;
use crate::error::{PolymeshError, PolymeshResult};
use crate::transaction::TransactionQueue;
use async_trait::async_trait;
use tracing::{debug, info};

/// What [`Procedure::prepare_transactions`] hands back.
#[derive(Debug)]
pub struct Prepared<T> {
    /// The accumulator, extended with this Procedure's transactions.
    pub accumulator: TransactionAccumulator,
    /// The Procedure's result.
    pub result: MaybePostValue<T>,
}

impl<T> Prepared<T> {
    /// Bundles an accumulator with a result.
    pub fn new(accumulator: TransactionAccumulator, result: impl Into<MaybePostValue<T>>) -> Self {
        Self {
            accumulator,
            result: result.into(),
        }
    }
}

/// A unit of domain logic producing chain calls.
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Caller-supplied arguments.
    type Args: Send + Sync;
    /// What a successful run yields.
    type Output: Clone + Send + Sync + 'static;
    /// Query results shared by the preparation steps.
    type Storage: Send + Sync;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the read-only queries the other steps need.
    async fn prepare_storage(&self, args: &Self::Args, ctx: &Context)
        -> PolymeshResult<Self::Storage>;

    /// What the signer must be allowed to do.
    async fn authorization(
        &self,
        args: &Self::Args,
        ctx: &Context,
        storage: &Self::Storage,
    ) -> PolymeshResult<ProcedureAuthorization>;

    /// Checks preconditions and queues the calls.
    async fn prepare_transactions(
        &self,
        args: Self::Args,
        ctx: &Context,
        storage: &Self::Storage,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<Self::Output>>;

    /// Checks whether the signer may run this Procedure, without failing when
    /// it may not. Errors only when a query fails.
    async fn check_authorization(
        &self,
        args: &Self::Args,
        ctx: &Context,
    ) -> PolymeshResult<AuthorizationStatus> {
        let storage = self.prepare_storage(args, ctx).await?;
        let required = self.authorization(args, ctx, &storage).await?;
        authorization::check(ctx, &required).await
    }

    /// Validates the Procedure and builds the queue of transactions it needs.
    async fn prepare(
        &self,
        args: Self::Args,
        ctx: &Context,
    ) -> PolymeshResult<TransactionQueue<Self::Output>> {
        let storage = self.prepare_storage(&args, ctx).await?;
        let required = self.authorization(&args, ctx, &storage).await?;
        let status = authorization::check(ctx, &required).await?;
        if !status.authorized {
            debug!(procedure = self.name(), %status, "Signer not authorized");
            return Err(PolymeshError::UnmetAuthorizations(Box::new(status)));
        }

        let accumulator = TransactionAccumulator::new(ctx.config().max_batch_size());
        let Prepared {
            accumulator,
            result,
        } = self
            .prepare_transactions(args, ctx, &storage, accumulator)
            .await?;

        let (entries, nested) = accumulator.into_parts();
        let authorization = nested
            .into_iter()
            .fold(status, AuthorizationStatus::merge);
        info!(
            procedure = self.name(),
            transactions = entries.len(),
            "Procedure prepared"
        );
        Ok(TransactionQueue::new(
            self.name(),
            entries,
            result,
            authorization,
            ctx.clone(),
        ))
    }
}
