use crate::domain::money::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payin,
    Payout,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Sbp,
    Card,
    Account,
    Qr,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Disputed,
    Cancelled,
}

impl TransactionStatus {
    /// The status machine. `Disputed` is reachable from any non-terminal
    /// state but only the dispute resolver drives that edge, and only the
    /// resolver moves a transaction out of `Disputed` again.
    pub fn can_transition(self, to: TransactionStatus) -> bool {
        use TransactionStatus::*;
        match self {
            Pending => matches!(to, Processing | Cancelled | Disputed),
            Processing => matches!(to, Completed | Failed | Cancelled | Disputed),
            Disputed => matches!(to, Completed | Failed),
            Completed | Failed | Cancelled => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled
        )
    }
}

/// A payin or payout attempt owned by a single trader.
///
/// Never physically deleted; archival happens through terminal statuses.
/// `version` is the optimistic-concurrency stamp checked by the stores.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: Uuid,
    /// Human-readable order code, globally unique.
    pub order_code: String,
    pub trader_id: Uuid,
    pub requisite_id: Option<Uuid>,
    pub kind: TransactionKind,
    /// Fiat amount, 2 decimal places.
    pub amount: Decimal,
    /// Amount in the settlement currency, 6 decimal places.
    pub amount_settlement: Decimal,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub card_last4: Option<String>,
    pub bank_name: Option<String>,
    pub client_ref: Option<String>,
    pub direction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// Input for `TransactionLedger::create`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Amount,
    pub amount_settlement: Amount,
    pub method: PaymentMethod,
    pub requisite_id: Option<Uuid>,
    pub client_ref: Option<String>,
    pub direction: Option<String>,
}

impl Transaction {
    pub fn create(order_code: String, trader_id: Uuid, new: &NewTransaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_code,
            trader_id,
            requisite_id: new.requisite_id,
            kind: new.kind,
            amount: new.amount.value(),
            amount_settlement: new.amount_settlement.value(),
            method: new.method,
            status: TransactionStatus::Pending,
            card_last4: None,
            bank_name: None,
            client_ref: new.client_ref.clone(),
            direction: new.direction.clone(),
            created_at: Utc::now(),
            completed_at: None,
            version: 0,
        }
    }
}
