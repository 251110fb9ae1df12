//! The financial effects of a transaction reaching a terminal state.
//!
//! Completion is the single trigger point that fans out to the trader's
//! balance and the requisite's usage counters; the caller commits the
//! mutated copies through `TransactionStore::settle` so the whole fan-out
//! is one atomic unit.

use crate::domain::account::TraderAccount;
use crate::domain::requisite::Requisite;
use crate::domain::transaction::{Transaction, TransactionKind, TransactionStatus};
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};

/// Applies `tx`'s terminal outcome to in-memory copies of the account and
/// requisite. On error the copies must be discarded, not committed.
///
/// A failed transaction moves no funds and records no usage; it still runs
/// through here so both terminal states share one settlement path.
pub(crate) fn apply_terminal(
    tx: &Transaction,
    account: &mut TraderAccount,
    requisite: Option<&mut Requisite>,
    now: DateTime<Utc>,
) -> Result<()> {
    match tx.status {
        TransactionStatus::Completed => {
            if let Some(requisite) = requisite {
                requisite.record_usage(tx.amount, now)?;
            }
            match tx.kind {
                TransactionKind::Payin => account.credit(tx.amount_settlement),
                TransactionKind::Payout => account.debit(tx.amount_settlement)?,
            }
            Ok(())
        }
        TransactionStatus::Failed => Ok(()),
        other => Err(EngineError::validation(format!(
            "settlement requires a terminal financial status, got {other:?}"
        ))),
    }
}
