use crate::domain::account::{Caller, Role};
use crate::domain::notification::{BankNotification, NewBankNotification};
use crate::domain::ports::{NotificationStoreBox, PageOf, PageRequest};
use crate::error::{EngineError, Result};
use crate::extract;
use uuid::Uuid;

/// Ingestion of raw bank notifications and their extracted signals.
pub struct NotificationInbox {
    notifications: NotificationStoreBox,
}

impl NotificationInbox {
    pub fn new(notifications: NotificationStoreBox) -> Self {
        Self { notifications }
    }

    /// Ingests one notification, running signal extraction over it.
    ///
    /// Trader-only. Extraction is best effort and never blocks ingestion:
    /// however noisy the text, the notification is persisted for manual
    /// follow-up.
    pub async fn ingest(
        &self,
        caller: &Caller,
        new: NewBankNotification,
    ) -> Result<BankNotification> {
        if caller.role != Role::Trader {
            return Err(EngineError::Forbidden(
                "only traders can send notifications".into(),
            ));
        }

        let signal = extract::extract(&new.title, &new.text);
        let notification = BankNotification::ingested(caller.user_id, new, signal);
        self.notifications.insert(notification.clone()).await?;
        tracing::debug!(
            notification = %notification.id,
            app = %notification.app_package,
            amount = ?notification.signal.amount,
            "notification ingested"
        );
        Ok(notification)
    }

    /// Traders see their own inbox; back-office roles see every trader's.
    pub async fn list(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<PageOf<BankNotification>> {
        let scope = match caller.role {
            Role::Trader => Some(caller.user_id),
            _ => None,
        };
        self.notifications.list(scope, page).await
    }

    /// Flags a notification as handled by the downstream reconciliation
    /// step. Back-office only.
    pub async fn mark_processed(&self, caller: &Caller, id: Uuid) -> Result<BankNotification> {
        if caller.role == Role::Trader {
            return Err(EngineError::Forbidden(
                "traders cannot mark notifications as processed".into(),
            ));
        }
        self.notifications.mark_processed(id).await
    }
}
