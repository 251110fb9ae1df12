use crate::extract::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw mobile-banking notification plus the signal extracted from it.
///
/// Immutable once parsed; `is_processed` is the only expected post-creation
/// mutation, flipped by the downstream reconciliation step.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BankNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub app_package: String,
    pub app_name: Option<String>,
    pub title: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub signal: Signal,
    pub raw_data: Option<serde_json::Value>,
    pub is_processed: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for `NotificationInbox::ingest`.
#[derive(Debug, Clone)]
pub struct NewBankNotification {
    pub app_package: String,
    pub app_name: Option<String>,
    pub title: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub raw_data: Option<serde_json::Value>,
}

impl BankNotification {
    pub fn ingested(user_id: Uuid, new: NewBankNotification, signal: Signal) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            app_package: new.app_package,
            app_name: new.app_name,
            title: new.title,
            text: new.text,
            posted_at: new.posted_at,
            signal,
            raw_data: new.raw_data,
            is_processed: false,
            created_at: Utc::now(),
        }
    }
}
