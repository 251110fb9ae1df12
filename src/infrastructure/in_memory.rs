use crate::domain::account::{TraderAccount, WalletTransaction};
use crate::domain::dispute::{Dispute, DisputeStatus, DisputeView};
use crate::domain::notification::BankNotification;
use crate::domain::ports::{
    AccountStore, DisputeStore, NotificationStore, PageOf, PageRequest, RequisiteStore,
    TransactionFilter, TransactionStore, WalletStore,
};
use crate::domain::requisite::Requisite;
use crate::domain::transaction::Transaction;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    transactions: HashMap<Uuid, Transaction>,
    order_codes: HashSet<String>,
    disputes: HashMap<Uuid, Dispute>,
    dispute_by_transaction: HashMap<Uuid, Uuid>,
    accounts: HashMap<Uuid, TraderAccount>,
    wallet_transactions: HashMap<Uuid, WalletTransaction>,
    requisites: HashMap<Uuid, Requisite>,
    notifications: HashMap<Uuid, BankNotification>,
}

/// A thread-safe in-memory backing store implementing every port.
///
/// All maps live behind one `RwLock`, which is what makes the compound port
/// operations (dispute open, withdrawal reserve, settlement commit) atomic:
/// a write guard spans the version checks and all the writes they protect.
/// Clones share the underlying state, so one store can be boxed once per
/// port, the way the services consume them.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> PageOf<T> {
    let total = items.len();
    let start = page.offset().min(total);
    let end = (start + page.size()).min(total);
    items.drain(..start);
    items.truncate(end - start);
    PageOf { items, total }
}

/// Compare-and-swap an entity into a map: the stored version must equal the
/// incoming one (or the entity must be absent at version 0), and the stored
/// copy gets the bumped version.
fn cas<T: Clone>(
    map: &mut HashMap<Uuid, T>,
    id: Uuid,
    entity: T,
    version: impl Fn(&T) -> u64,
    bump: impl Fn(&mut T),
    what: &str,
) -> Result<T> {
    match map.get(&id) {
        Some(stored) if version(stored) == version(&entity) => {
            let mut entity = entity;
            bump(&mut entity);
            map.insert(id, entity.clone());
            Ok(entity)
        }
        Some(_) => Err(EngineError::conflict(format!(
            "{what} was modified concurrently"
        ))),
        None if version(&entity) == 0 => {
            let mut entity = entity;
            bump(&mut entity);
            map.insert(id, entity.clone());
            Ok(entity)
        }
        None => Err(EngineError::NotFound),
    }
}

fn check_version<T>(
    map: &HashMap<Uuid, T>,
    id: Uuid,
    incoming: u64,
    version: impl Fn(&T) -> u64,
    what: &str,
) -> Result<()> {
    match map.get(&id) {
        Some(stored) if version(stored) == incoming => Ok(()),
        Some(_) => Err(EngineError::conflict(format!(
            "{what} was modified concurrently"
        ))),
        None if incoming == 0 => Ok(()),
        None => Err(EngineError::NotFound),
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert(&self, tx: Transaction) -> Result<()> {
        let mut state = self.state.write().await;
        if state.order_codes.contains(&tx.order_code) {
            return Err(EngineError::conflict(format!(
                "order code {} is already taken",
                tx.order_code
            )));
        }
        state.order_codes.insert(tx.order_code.clone());
        state.transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn get(&self, trader_id: Uuid, id: Uuid) -> Result<Option<Transaction>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .get(&id)
            .filter(|tx| tx.trader_id == trader_id)
            .cloned())
    }

    async fn list(
        &self,
        trader_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageOf<Transaction>> {
        let state = self.state.read().await;
        let mut items: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|tx| tx.trader_id == trader_id)
            .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
            .filter(|tx| filter.status.is_none_or(|status| tx.status == status))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn update(&self, tx: Transaction) -> Result<Transaction> {
        let mut state = self.state.write().await;
        cas(
            &mut state.transactions,
            tx.id,
            tx,
            |t| t.version,
            |t| t.version += 1,
            "transaction",
        )
    }

    async fn settle(
        &self,
        tx: Transaction,
        account: TraderAccount,
        requisite: Option<Requisite>,
    ) -> Result<Transaction> {
        let mut state = self.state.write().await;

        // All version checks up front so the commit is all-or-nothing.
        check_version(&state.transactions, tx.id, tx.version, |t| t.version, "transaction")?;
        check_version(
            &state.accounts,
            account.trader_id,
            account.version,
            |a| a.version,
            "account",
        )?;
        if let Some(req) = &requisite {
            check_version(&state.requisites, req.id, req.version, |r| r.version, "requisite")?;
        }

        let account_id = account.trader_id;
        cas(
            &mut state.accounts,
            account_id,
            account,
            |a| a.version,
            |a| a.version += 1,
            "account",
        )?;
        if let Some(req) = requisite {
            let req_id = req.id;
            cas(
                &mut state.requisites,
                req_id,
                req,
                |r| r.version,
                |r| r.version += 1,
                "requisite",
            )?;
        }
        cas(
            &mut state.transactions,
            tx.id,
            tx,
            |t| t.version,
            |t| t.version += 1,
            "transaction",
        )
    }
}

#[async_trait]
impl DisputeStore for InMemoryStore {
    async fn open(&self, dispute: Dispute, parent: Transaction) -> Result<Dispute> {
        let mut state = self.state.write().await;
        if state.dispute_by_transaction.contains_key(&parent.id) {
            return Err(EngineError::conflict(
                "dispute already exists for this transaction",
            ));
        }
        check_version(&state.transactions, parent.id, parent.version, |t| t.version, "transaction")?;

        cas(
            &mut state.transactions,
            parent.id,
            parent,
            |t| t.version,
            |t| t.version += 1,
            "transaction",
        )?;
        state
            .dispute_by_transaction
            .insert(dispute.transaction_id, dispute.id);
        state.disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    async fn get(&self, trader_id: Uuid, id: Uuid) -> Result<Option<Dispute>> {
        let state = self.state.read().await;
        Ok(state
            .disputes
            .get(&id)
            .filter(|d| d.trader_id == trader_id)
            .cloned())
    }

    async fn list(
        &self,
        trader_id: Uuid,
        status: Option<DisputeStatus>,
    ) -> Result<PageOf<DisputeView>> {
        let state = self.state.read().await;
        let mut items: Vec<DisputeView> = state
            .disputes
            .values()
            .filter(|d| d.trader_id == trader_id)
            .filter(|d| status.is_none_or(|s| d.status == s))
            .map(|d| {
                let tx = state.transactions.get(&d.transaction_id);
                DisputeView {
                    dispute: d.clone(),
                    order_code: tx.map(|t| t.order_code.clone()).unwrap_or_default(),
                    method: tx
                        .map(|t| t.method)
                        .unwrap_or(crate::domain::transaction::PaymentMethod::Card),
                    bank_name: tx.and_then(|t| t.bank_name.clone()),
                    card_last4: tx.and_then(|t| t.card_last4.clone()),
                    direction: tx.and_then(|t| t.direction.clone()),
                }
            })
            .collect();
        items.sort_by(|a, b| b.dispute.created_at.cmp(&a.dispute.created_at));
        let total = items.len();
        Ok(PageOf { items, total })
    }

    async fn update(&self, dispute: Dispute) -> Result<Dispute> {
        let mut state = self.state.write().await;
        cas(
            &mut state.disputes,
            dispute.id,
            dispute,
            |d| d.version,
            |d| d.version += 1,
            "dispute",
        )
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn get(&self, trader_id: Uuid) -> Result<Option<TraderAccount>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&trader_id).cloned())
    }

    async fn put(&self, account: TraderAccount) -> Result<()> {
        let mut state = self.state.write().await;
        state.accounts.insert(account.trader_id, account);
        Ok(())
    }

    async fn update(&self, account: TraderAccount) -> Result<TraderAccount> {
        let mut state = self.state.write().await;
        cas(
            &mut state.accounts,
            account.trader_id,
            account,
            |a| a.version,
            |a| a.version += 1,
            "account",
        )
    }
}

#[async_trait]
impl WalletStore for InMemoryStore {
    async fn reserve(
        &self,
        account: TraderAccount,
        wtx: WalletTransaction,
    ) -> Result<WalletTransaction> {
        let mut state = self.state.write().await;
        let account_id = account.trader_id;
        cas(
            &mut state.accounts,
            account_id,
            account,
            |a| a.version,
            |a| a.version += 1,
            "account",
        )?;
        state.wallet_transactions.insert(wtx.id, wtx.clone());
        Ok(wtx)
    }

    async fn finalize(
        &self,
        account: TraderAccount,
        wtx: WalletTransaction,
    ) -> Result<WalletTransaction> {
        let mut state = self.state.write().await;
        check_version(
            &state.wallet_transactions,
            wtx.id,
            wtx.version,
            |w| w.version,
            "wallet transaction",
        )?;
        let account_id = account.trader_id;
        cas(
            &mut state.accounts,
            account_id,
            account,
            |a| a.version,
            |a| a.version += 1,
            "account",
        )?;
        cas(
            &mut state.wallet_transactions,
            wtx.id,
            wtx,
            |w| w.version,
            |w| w.version += 1,
            "wallet transaction",
        )
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<WalletTransaction>> {
        let state = self.state.read().await;
        Ok(state
            .wallet_transactions
            .get(&id)
            .filter(|w| w.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<WalletTransaction>> {
        let state = self.state.read().await;
        let mut items: Vec<WalletTransaction> = state
            .wallet_transactions
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

#[async_trait]
impl RequisiteStore for InMemoryStore {
    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Requisite>> {
        let state = self.state.read().await;
        Ok(state
            .requisites
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .cloned())
    }

    async fn put(&self, requisite: Requisite) -> Result<()> {
        let mut state = self.state.write().await;
        state.requisites.insert(requisite.id, requisite);
        Ok(())
    }

    async fn update(&self, requisite: Requisite) -> Result<Requisite> {
        let mut state = self.state.write().await;
        cas(
            &mut state.requisites,
            requisite.id,
            requisite,
            |r| r.version,
            |r| r.version += 1,
            "requisite",
        )
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert(&self, notification: BankNotification) -> Result<()> {
        let mut state = self.state.write().await;
        state.notifications.insert(notification.id, notification);
        Ok(())
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PageOf<BankNotification>> {
        let state = self.state.read().await;
        let mut items: Vec<BankNotification> = state
            .notifications
            .values()
            .filter(|n| user_id.is_none_or(|user| n.user_id == user))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn mark_processed(&self, id: Uuid) -> Result<BankNotification> {
        let mut state = self.state.write().await;
        let notification = state.notifications.get_mut(&id).ok_or(EngineError::NotFound)?;
        notification.is_processed = true;
        Ok(notification.clone())
    }
}
