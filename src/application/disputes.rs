use crate::application::ledger::TransactionLedger;
use crate::domain::account::Caller;
use crate::domain::dispute::{Dispute, DisputeReason, DisputeStatus, DisputeView};
use crate::domain::ports::{DisputeStoreBox, PageOf};
use crate::domain::transaction::TransactionStatus;
use crate::error::{EngineError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Fields a trader may change on an existing dispute.
#[derive(Debug, Default, Clone)]
pub struct DisputeUpdate {
    pub trader_response: Option<String>,
    pub status: Option<DisputeStatus>,
}

/// Owns disputes and the cross-entity transition that forces the parent
/// transaction into (and eventually out of) the `Disputed` state.
pub struct DisputeResolver {
    disputes: DisputeStoreBox,
    ledger: Arc<TransactionLedger>,
}

impl DisputeResolver {
    pub fn new(disputes: DisputeStoreBox, ledger: Arc<TransactionLedger>) -> Self {
        Self { disputes, ledger }
    }

    /// Escalates an owned, non-terminal transaction into a dispute.
    ///
    /// The uniqueness check, the dispute insert and the parent's flip to
    /// `Disputed` are one atomic store operation; of two concurrent creates
    /// one wins and the other gets `Conflict`.
    pub async fn create(
        &self,
        caller: &Caller,
        transaction_id: Uuid,
        reason: DisputeReason,
        description: Option<String>,
        client_message: Option<String>,
    ) -> Result<Dispute> {
        let tx = self.ledger.get(caller, transaction_id).await?;
        if !tx.status.can_transition(TransactionStatus::Disputed) {
            return Err(EngineError::validation(format!(
                "a {:?} transaction cannot be disputed",
                tx.status
            )));
        }

        let dispute = Dispute::open_against(&tx, reason, description, client_message, Utc::now());
        let mut parent = tx;
        parent.status = TransactionStatus::Disputed;

        let dispute = self.disputes.open(dispute, parent).await?;
        tracing::info!(
            dispute = %dispute.id,
            transaction = %dispute.transaction_id,
            reason = ?dispute.reason,
            "dispute opened"
        );
        Ok(dispute)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Dispute> {
        self.disputes
            .get(caller.user_id, id)
            .await?
            .ok_or(EngineError::NotFound)
    }

    pub async fn list(
        &self,
        caller: &Caller,
        status: Option<DisputeStatus>,
    ) -> Result<PageOf<DisputeView>> {
        self.disputes.list(caller.user_id, status).await
    }

    /// Updates an owned dispute. Setting `trader_response` is unrestricted;
    /// status changes follow the dispute's transition table, and a terminal
    /// status stamps `resolved_at` and resolves the parent transaction.
    ///
    /// The parent is settled before the terminal status is committed, so a
    /// failed settlement (overdraw, limit, version conflict) leaves the
    /// dispute in its previous state and the update can simply be retried.
    /// On the reverse partial failure the retry finds the parent already
    /// terminal and `resolve_parent` is a no-op.
    pub async fn update(&self, caller: &Caller, id: Uuid, update: DisputeUpdate) -> Result<Dispute> {
        let mut dispute = self.get(caller, id).await?;

        if let Some(response) = update.trader_response {
            dispute.trader_response = Some(response);
        }

        let mut resolved = false;
        if let Some(status) = update.status {
            if !dispute.status.can_transition(status) {
                return Err(EngineError::validation(format!(
                    "cannot move dispute from {:?} to {status:?}",
                    dispute.status
                )));
            }
            dispute.status = status;
            if status.is_terminal() {
                dispute.resolved_at = Some(Utc::now());
                self.resolve_parent(caller, &dispute).await?;
                resolved = true;
            }
        }

        let dispute = self.disputes.update(dispute).await?;
        if resolved {
            tracing::info!(
                dispute = %dispute.id,
                outcome = ?dispute.status,
                "dispute resolved"
            );
        }
        Ok(dispute)
    }

    /// Returns the parent to a terminal financial state: `Won` and
    /// `Resolved` put it back to `Completed` (running the usual settlement
    /// fan-out), `Lost` moves it to `Failed` with no funds moving.
    async fn resolve_parent(&self, caller: &Caller, dispute: &Dispute) -> Result<()> {
        let mut tx = self.ledger.get(caller, dispute.transaction_id).await?;
        if tx.status != TransactionStatus::Disputed {
            return Ok(());
        }
        tx.status = match dispute.status {
            DisputeStatus::Won | DisputeStatus::Resolved => TransactionStatus::Completed,
            DisputeStatus::Lost => TransactionStatus::Failed,
            _ => return Ok(()),
        };
        if tx.status == TransactionStatus::Completed {
            tx.completed_at = Some(Utc::now());
        }
        self.ledger.settle_terminal(tx).await?;
        Ok(())
    }
}
