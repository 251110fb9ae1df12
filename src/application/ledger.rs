use crate::application::settlement;
use crate::domain::account::{Caller, TraderAccount};
use crate::domain::ports::{
    AccountStoreBox, PageOf, PageRequest, RequisiteStoreBox, TransactionFilter,
    TransactionStoreBox,
};
use crate::domain::transaction::{NewTransaction, Transaction, TransactionStatus};
use crate::error::{EngineError, Result};
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

const ORDER_CODE_LEN: usize = 8;
const ORDER_CODE_ATTEMPTS: usize = 5;
const ORDER_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";

/// Owns transactions, their status machine and order-code generation, and
/// drives the settlement fan-out when a transaction reaches a terminal
/// financial state.
pub struct TransactionLedger {
    transactions: TransactionStoreBox,
    accounts: AccountStoreBox,
    requisites: RequisiteStoreBox,
}

fn order_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_CODE_LEN)
        .map(|_| ORDER_CODE_ALPHABET[rng.gen_range(0..ORDER_CODE_ALPHABET.len())] as char)
        .collect();
    format!("ORD-{suffix}")
}

impl TransactionLedger {
    pub fn new(
        transactions: TransactionStoreBox,
        accounts: AccountStoreBox,
        requisites: RequisiteStoreBox,
    ) -> Self {
        Self {
            transactions,
            accounts,
            requisites,
        }
    }

    /// Creates a `Pending` transaction owned by the caller.
    ///
    /// The store detects order-code collisions; creation retries with a
    /// fresh code a bounded number of times, so uniqueness holds under
    /// concurrent creation.
    pub async fn create(&self, caller: &Caller, new: NewTransaction) -> Result<Transaction> {
        for attempt in 1..=ORDER_CODE_ATTEMPTS {
            let tx = Transaction::create(order_code(), caller.user_id, &new);
            match self.transactions.insert(tx.clone()).await {
                Ok(()) => {
                    tracing::info!(order_code = %tx.order_code, kind = ?tx.kind, "transaction created");
                    return Ok(tx);
                }
                Err(EngineError::Conflict(_)) => {
                    tracing::warn!(attempt, "order code collision, regenerating");
                }
                Err(other) => return Err(other),
            }
        }
        Err(EngineError::conflict("could not allocate a unique order code"))
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Transaction> {
        self.transactions
            .get(caller.user_id, id)
            .await?
            .ok_or(EngineError::NotFound)
    }

    pub async fn list(
        &self,
        caller: &Caller,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageOf<Transaction>> {
        self.transactions.list(caller.user_id, filter, page).await
    }

    /// Moves an owned transaction along the status machine.
    ///
    /// `Disputed` is not a valid target here (dispute creation owns that
    /// edge), and a disputed transaction only leaves that state through its
    /// dispute's resolution. Reaching `Completed` stamps `completed_at`;
    /// `Completed` and `Failed` both commit through the settlement path.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        let mut tx = self.get(caller, id).await?;
        if status == TransactionStatus::Disputed {
            return Err(EngineError::validation(
                "disputed is entered by creating a dispute",
            ));
        }
        if tx.status == TransactionStatus::Disputed {
            return Err(EngineError::validation(
                "disputed transactions are resolved through their dispute",
            ));
        }
        if !tx.status.can_transition(status) {
            return Err(EngineError::validation(format!(
                "cannot move transaction from {:?} to {status:?}",
                tx.status
            )));
        }

        tx.status = status;
        match status {
            TransactionStatus::Completed => {
                tx.completed_at = Some(Utc::now());
                self.settle_terminal(tx).await
            }
            TransactionStatus::Failed => self.settle_terminal(tx).await,
            _ => self.transactions.update(tx).await,
        }
    }

    /// Commits a transaction that reached `Completed` or `Failed`, fanning
    /// out to the owner's balance and the requisite's usage counters in one
    /// atomic store operation. Also used by dispute resolution, which is the
    /// only other place a transaction reaches a terminal financial state.
    pub(crate) async fn settle_terminal(&self, tx: Transaction) -> Result<Transaction> {
        let now = Utc::now();
        let mut account = self
            .accounts
            .get(tx.trader_id)
            .await?
            .unwrap_or_else(|| TraderAccount::new(tx.trader_id));
        let mut requisite = match tx.requisite_id {
            Some(id) => Some(
                self.requisites
                    .get(tx.trader_id, id)
                    .await?
                    .ok_or(EngineError::NotFound)?,
            ),
            None => None,
        };

        settlement::apply_terminal(&tx, &mut account, requisite.as_mut(), now)?;
        let tx = self.transactions.settle(tx, account, requisite).await?;
        tracing::info!(order_code = %tx.order_code, status = ?tx.status, "transaction settled");
        Ok(tx)
    }
}
