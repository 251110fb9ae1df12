use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Investor,
    Support,
    Teamlead,
    Trader,
}

/// The authenticated identity attached to every call, provided by the
/// external auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn trader(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Trader,
        }
    }
}

/// Per-trader balance ledger.
///
/// `working_balance` is spendable, `pending_balance` is reserved awaiting
/// external confirmation. `working_balance >= 0` holds at all times; every
/// mutation below preserves it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TraderAccount {
    pub trader_id: Uuid,
    pub working_balance: Decimal,
    pub pending_balance: Decimal,
    pub security_deposit: Decimal,
    pub security_deposit_required: Decimal,
    pub version: u64,
}

impl TraderAccount {
    pub fn new(trader_id: Uuid) -> Self {
        Self {
            trader_id,
            working_balance: Decimal::ZERO,
            pending_balance: Decimal::ZERO,
            security_deposit: Decimal::ZERO,
            security_deposit_required: dec!(500),
            version: 0,
        }
    }

    /// Credits the spendable pool (completed payin settlement).
    pub fn credit(&mut self, amount: Decimal) {
        self.working_balance += amount;
    }

    /// Debits the spendable pool (completed payout settlement).
    pub fn debit(&mut self, amount: Decimal) -> Result<()> {
        if self.working_balance >= amount {
            self.working_balance -= amount;
            Ok(())
        } else {
            Err(EngineError::InsufficientBalance {
                available: self.working_balance,
                requested: amount,
            })
        }
    }

    /// Moves funds from working to pending (withdrawal reservation).
    pub fn reserve(&mut self, amount: Decimal) -> Result<()> {
        if self.working_balance >= amount {
            self.working_balance -= amount;
            self.pending_balance += amount;
            Ok(())
        } else {
            Err(EngineError::InsufficientBalance {
                available: self.working_balance,
                requested: amount,
            })
        }
    }

    /// Releases a confirmed reservation; the funds leave the ledger.
    pub fn settle_reserved(&mut self, amount: Decimal) -> Result<()> {
        if self.pending_balance >= amount {
            self.pending_balance -= amount;
            Ok(())
        } else {
            Err(EngineError::conflict("pending balance mismatch"))
        }
    }

    /// Returns a failed or cancelled reservation to the spendable pool.
    pub fn restore_reserved(&mut self, amount: Decimal) -> Result<()> {
        if self.pending_balance >= amount {
            self.pending_balance -= amount;
            self.working_balance += amount;
            Ok(())
        } else {
            Err(EngineError::conflict("pending balance mismatch"))
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WalletTransactionKind {
    Deposit,
    Withdraw,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WalletTransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// A movement of settlement-currency funds into or out of the platform
/// wallet. Withdrawals start `Pending` and either complete (funds leave) or
/// fail/cancel (reservation returned).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub status: WalletTransactionStatus,
    pub tx_hash: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl WalletTransaction {
    pub fn withdrawal(user_id: Uuid, amount: Decimal, address: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: WalletTransactionKind::Withdraw,
            amount,
            status: WalletTransactionStatus::Pending,
            tx_hash: None,
            address: Some(address),
            created_at: Utc::now(),
            completed_at: None,
            version: 0,
        }
    }
}
