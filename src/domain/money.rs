use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A positive monetary amount.
///
/// Wrapper around `rust_decimal::Decimal` so that transaction and withdrawal
/// amounts are validated once, at the boundary, and carry the guarantee
/// through the rest of the engine.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EngineError::validation("amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
