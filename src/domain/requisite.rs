use crate::domain::transaction::PaymentMethod;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RequisiteKind {
    Card,
    Account,
    Sbp,
}

/// A bank instrument a trader receives or pays through, with rolling usage
/// accounting that gates how much volume it may process.
///
/// Counters reset on UTC calendar boundaries: the daily counter restarts when
/// usage is recorded on a later UTC day than `last_used_at`, the monthly
/// counter when the UTC month changes. The reset is applied lazily, at the
/// next `record_usage` call.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Requisite {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: RequisiteKind,
    pub bank_name: String,
    pub card_number: Option<String>,
    pub account_number: Option<String>,
    pub phone: Option<String>,
    pub holder_name: String,
    pub is_active: bool,
    pub daily_limit: Decimal,
    pub daily_used: Decimal,
    pub monthly_limit: Decimal,
    pub monthly_used: Decimal,
    pub total_processed: Decimal,
    pub transactions_count: u64,
    pub methods: Vec<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl Requisite {
    pub fn new(owner_id: Uuid, kind: RequisiteKind, bank_name: String, holder_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            bank_name,
            card_number: None,
            account_number: None,
            phone: None,
            holder_name,
            is_active: true,
            daily_limit: dec!(300000),
            daily_used: Decimal::ZERO,
            monthly_limit: dec!(5000000),
            monthly_used: Decimal::ZERO,
            total_processed: Decimal::ZERO,
            transactions_count: 0,
            methods: Vec::new(),
            created_at: Utc::now(),
            last_used_at: None,
            version: 0,
        }
    }

    fn roll_windows(&mut self, now: DateTime<Utc>) {
        let Some(last) = self.last_used_at else {
            return;
        };
        if (last.year(), last.month()) != (now.year(), now.month()) {
            self.monthly_used = Decimal::ZERO;
            self.daily_used = Decimal::ZERO;
        } else if last.date_naive() != now.date_naive() {
            self.daily_used = Decimal::ZERO;
        }
    }

    /// Checks both usage windows and, if the settlement fits, records it.
    ///
    /// On rejection nothing is recorded: `daily_used`/`monthly_used` keep the
    /// values they had for the current windows.
    pub fn record_usage(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active {
            return Err(EngineError::validation("requisite is not active"));
        }
        self.roll_windows(now);
        if self.daily_used + amount > self.daily_limit {
            return Err(EngineError::LimitExceeded {
                window: "daily",
                limit: self.daily_limit,
                used: self.daily_used,
                requested: amount,
            });
        }
        if self.monthly_used + amount > self.monthly_limit {
            return Err(EngineError::LimitExceeded {
                window: "monthly",
                limit: self.monthly_limit,
                used: self.monthly_used,
                requested: amount,
            });
        }
        self.daily_used += amount;
        self.monthly_used += amount;
        self.total_processed += amount;
        self.transactions_count += 1;
        self.last_used_at = Some(now);
        Ok(())
    }
}
