use crate::domain::transaction::Transaction;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a trader has to answer a dispute before the SLA clock runs out.
pub const DISPUTE_SLA: Duration = Duration::hours(1);

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Open,
    Pending,
    Resolved,
    Won,
    Lost,
}

impl DisputeStatus {
    pub fn can_transition(self, to: DisputeStatus) -> bool {
        use DisputeStatus::*;
        match self {
            Open => matches!(to, Pending | Resolved | Won | Lost),
            Pending => matches!(to, Resolved | Won | Lost),
            Resolved | Won | Lost => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DisputeStatus::Resolved | DisputeStatus::Won | DisputeStatus::Lost
        )
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    PaymentNotReceived,
    AmountMismatch,
    DuplicatePayment,
    WrongDetails,
    Timeout,
    Other,
}

/// A client dispute over one transaction's settlement outcome.
///
/// Exactly one dispute may ever exist per transaction. Amounts are
/// snapshotted from the parent at creation and never change afterwards.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Dispute {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub trader_id: Uuid,
    pub amount: Decimal,
    pub amount_settlement: Decimal,
    pub status: DisputeStatus,
    pub reason: DisputeReason,
    pub description: Option<String>,
    pub client_message: Option<String>,
    pub trader_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl Dispute {
    /// Opens a dispute against `parent`, snapshotting its amounts and
    /// starting the SLA clock at `now`.
    pub fn open_against(
        parent: &Transaction,
        reason: DisputeReason,
        description: Option<String>,
        client_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id: parent.id,
            trader_id: parent.trader_id,
            amount: parent.amount,
            amount_settlement: parent.amount_settlement,
            status: DisputeStatus::Open,
            reason,
            description,
            client_message,
            trader_response: None,
            created_at: now,
            deadline_at: now + DISPUTE_SLA,
            resolved_at: None,
            version: 0,
        }
    }
}

/// A dispute joined with a summary of its parent transaction, as returned by
/// dispute listings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DisputeView {
    pub dispute: Dispute,
    pub order_code: String,
    pub method: crate::domain::transaction::PaymentMethod,
    pub bank_name: Option<String>,
    pub card_last4: Option<String>,
    pub direction: Option<String>,
}
