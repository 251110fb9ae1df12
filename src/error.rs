use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the settlement engine.
///
/// Everything except `Storage` and `Csv` is caller-recoverable and carries a
/// specific reason. `NotFound` is deliberately identical for "missing" and
/// "owned by another trader" so callers cannot probe for foreign entities.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not found")]
    NotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("{window} limit exceeded: limit {limit}, used {used}, requested {requested}")]
    LimitExceeded {
        window: &'static str,
        limit: Decimal,
        used: Decimal,
        requested: Decimal,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation(reason.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        EngineError::Conflict(reason.into())
    }
}
