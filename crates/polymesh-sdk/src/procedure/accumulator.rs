//! The value threaded through Procedure composition.

use crate::authorization::{self, AuthorizationStatus};
use crate::chain::Receipt;
use crate::context::Context;
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure};
use crate::transaction::TransactionSpec;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// A value known only once a transaction has succeeded.
pub struct PostTransactionValue<T> {
    cell: Arc<OnceLock<T>>,
}

impl<T> Clone for PostTransactionValue<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> PostTransactionValue<T> {
    fn new() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// The value, once its transaction succeeded.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns true once the value is known.
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for PostTransactionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PostTransactionValue")
            .field(&self.cell.get())
            .finish()
    }
}

/// A Procedure result: known at preparation time, or after a transaction.
#[derive(Debug, Clone)]
pub enum MaybePostValue<T> {
    /// Known at preparation time.
    Ready(T),
    /// Filled from the receipt of a transaction.
    Pending(PostTransactionValue<T>),
}

impl<T: Clone> MaybePostValue<T> {
    /// The value, if known.
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value.clone()),
            Self::Pending(pending) => pending.get().cloned(),
        }
    }

    pub(crate) fn resolve(&self) -> PolymeshResult<T> {
        self.value().ok_or_else(|| {
            PolymeshError::UnresolvedResult(
                "the transaction producing the result did not succeed".to_string(),
            )
        })
    }
}

impl<T> From<T> for MaybePostValue<T> {
    fn from(value: T) -> Self {
        Self::Ready(value)
    }
}

/// A unit of work queued by a Procedure.
#[derive(Debug)]
pub(crate) enum PreparedEntry {
    Single(TransactionSpec),
    Batch(Vec<TransactionSpec>),
}

/// Collects the transactions of a Procedure and of the Procedures it runs.
///
/// The accumulator is passed by value into
/// [`Procedure::prepare_transactions`] and handed back inside [`Prepared`];
/// every method consumes it and returns the extended accumulator.
#[derive(Debug)]
pub struct TransactionAccumulator {
    entries: Vec<PreparedEntry>,
    authorizations: Vec<AuthorizationStatus>,
    max_batch_size: usize,
}

impl TransactionAccumulator {
    pub(crate) fn new(max_batch_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            authorizations: Vec::new(),
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Number of queued entries. A batch counts as one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queues one transaction.
    pub fn add_transaction(mut self, spec: TransactionSpec) -> Self {
        debug!(call = %spec.tag(), "Transaction queued");
        self.entries.push(PreparedEntry::Single(spec));
        self
    }

    /// Queues one transaction whose receipt yields a value.
    ///
    /// The returned handle is filled when the transaction succeeds. If
    /// `resolve` fails, the transaction settles as `Failed`.
    pub fn add_transaction_with_result<T, F>(
        self,
        spec: TransactionSpec,
        resolve: F,
    ) -> (Self, PostTransactionValue<T>)
    where
        T: Send + Sync + 'static,
        F: Fn(&Receipt) -> PolymeshResult<T> + Send + Sync + 'static,
    {
        let value = PostTransactionValue::new();
        let cell = Arc::clone(&value.cell);
        let spec = spec.with_resolver(Arc::new(move |receipt: &Receipt| {
            let resolved = resolve(receipt)?;
            // A resolver runs at most once per transaction.
            let _ = cell.set(resolved);
            Ok(())
        }));
        (self.add_transaction(spec), value)
    }

    /// Queues calls to be submitted atomically.
    ///
    /// A single call is queued as a plain transaction. More calls than the
    /// configured maximum fail with [`PolymeshError::InvalidArgument`]; the
    /// calls are never spread over several batches.
    pub fn add_batch(mut self, mut specs: Vec<TransactionSpec>) -> PolymeshResult<Self> {
        if specs.len() > self.max_batch_size {
            return Err(PolymeshError::invalid_argument(format!(
                "a batch holds at most {} calls, got {}",
                self.max_batch_size,
                specs.len()
            )));
        }
        match specs.len() {
            0 => {}
            1 => {
                if let Some(spec) = specs.pop() {
                    self = self.add_transaction(spec);
                }
            }
            calls => {
                debug!(calls, "Batch queued");
                self.entries.push(PreparedEntry::Batch(specs));
            }
        }
        Ok(self)
    }

    /// Runs a nested Procedure, adding its transactions after the ones queued
    /// so far.
    ///
    /// The nested Procedure's authorization is checked first; an unauthorized
    /// signer or a failed precondition fails the whole preparation.
    pub async fn add_procedure<P>(
        mut self,
        procedure: &P,
        args: P::Args,
        ctx: &Context,
    ) -> PolymeshResult<(Self, MaybePostValue<P::Output>)>
    where
        P: Procedure + ?Sized,
    {
        let storage = procedure.prepare_storage(&args, ctx).await?;
        let required = procedure.authorization(&args, ctx, &storage).await?;
        let status = authorization::check(ctx, &required).await?;
        if !status.authorized {
            debug!(procedure = procedure.name(), %status, "Nested procedure not authorized");
            return Err(PolymeshError::UnmetAuthorizations(Box::new(status)));
        }
        self.authorizations.push(status);

        let Prepared {
            accumulator,
            result,
        } = procedure
            .prepare_transactions(args, ctx, &storage, self)
            .await?;
        debug!(procedure = procedure.name(), "Nested procedure prepared");
        Ok((accumulator, result))
    }

    pub(crate) fn into_parts(self) -> (Vec<PreparedEntry>, Vec<AuthorizationStatus>) {
        (self.entries, self.authorizations)
    }
}
