use crate::authorization::{ProcedureAuthorization, SimplePermissions};
use crate::context::{Context, SignerInfo};
use crate::error::{PolymeshError, PolymeshResult};
use crate::procedure::{Prepared, Procedure, TransactionAccumulator};
use crate::transaction::TransactionSpec;
use async_trait::async_trait;
use polymesh_sdk_types::{tags, AccountId, Balance};
use serde_json::Value;

/// Memos are fixed 32-byte fields on chain.
pub const MAX_MEMO_LENGTH: usize = 32;

/// Arguments of [`TransferPolyx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPolyxArgs {
    /// Receiving account.
    pub to: AccountId,
    /// Amount of POLYX to send.
    pub amount: Balance,
    /// Optional note attached to the transfer.
    pub memo: Option<String>,
}

/// What [`TransferPolyx`] reads before queueing anything.
#[derive(Debug, Clone)]
pub struct TransferPolyxStorage {
    balance: Balance,
    receiver: SignerInfo,
    receiver_has_cdd: bool,
}

/// Sends POLYX from the signing account.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferPolyx;

fn encode_memo(memo: &str) -> PolymeshResult<String> {
    let bytes = memo.as_bytes();
    if bytes.len() > MAX_MEMO_LENGTH {
        return Err(PolymeshError::invalid_argument(format!(
            "the memo is {} bytes long, at most {MAX_MEMO_LENGTH} are allowed",
            bytes.len()
        )));
    }
    let mut padded = [0u8; MAX_MEMO_LENGTH];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(format!("0x{}", hex::encode(padded)))
}

#[async_trait]
impl Procedure for TransferPolyx {
    type Args = TransferPolyxArgs;
    type Output = ();
    type Storage = TransferPolyxStorage;

    fn name(&self) -> &'static str {
        "transferPolyx"
    }

    async fn prepare_storage(
        &self,
        args: &TransferPolyxArgs,
        ctx: &Context,
    ) -> PolymeshResult<TransferPolyxStorage> {
        let query = ctx.query();
        let balance = query.free_balance(ctx.signing_account()).await?;
        let receiver = query.signer_info(&args.to).await?;
        let receiver_has_cdd = match &receiver.identity {
            Some(did) => query.has_valid_cdd(did).await?,
            None => false,
        };
        Ok(TransferPolyxStorage {
            balance,
            receiver,
            receiver_has_cdd,
        })
    }

    async fn authorization(
        &self,
        _args: &TransferPolyxArgs,
        _ctx: &Context,
        _storage: &TransferPolyxStorage,
    ) -> PolymeshResult<ProcedureAuthorization> {
        Ok(ProcedureAuthorization::permissions(
            SimplePermissions::transactions([tags::transfer_with_memo()]),
        ))
    }

    async fn prepare_transactions(
        &self,
        args: TransferPolyxArgs,
        ctx: &Context,
        storage: &TransferPolyxStorage,
        accumulator: TransactionAccumulator,
    ) -> PolymeshResult<Prepared<()>> {
        if args.amount.is_zero() {
            return Err(PolymeshError::invalid_argument(
                "the amount to transfer must be greater than zero",
            ));
        }
        if &args.to == ctx.signing_account() {
            return Err(PolymeshError::invalid_argument(
                "cannot transfer POLYX to the signing account",
            ));
        }
        if args.amount > storage.balance {
            return Err(PolymeshError::InsufficientBalance {
                message: "not enough free POLYX to transfer".to_string(),
                required: args.amount,
                available: storage.balance,
            });
        }
        if storage.receiver.identity.is_none() {
            return Err(PolymeshError::invalid_argument(format!(
                "the receiving account {} is not associated with any identity",
                args.to
            )));
        }
        if !storage.receiver_has_cdd {
            return Err(PolymeshError::invalid_argument(format!(
                "the identity of the receiving account {} has no valid CDD claim",
                args.to
            )));
        }
        let memo = match &args.memo {
            Some(memo) => Value::String(encode_memo(memo)?),
            None => Value::Null,
        };

        let spec = TransactionSpec::new(
            tags::transfer_with_memo(),
            vec![
                serde_json::to_value(args.to)?,
                serde_json::to_value(args.amount)?,
                memo,
            ],
        );
        Ok(Prepared::new(accumulator.add_transaction(spec), ()))
    }
}
