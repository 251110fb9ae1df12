use crate::domain::account::{TraderAccount, WalletTransaction};
use crate::domain::dispute::{Dispute, DisputeStatus, DisputeView};
use crate::domain::notification::BankNotification;
use crate::domain::requisite::Requisite;
use crate::domain::transaction::{Transaction, TransactionKind, TransactionStatus};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// Validated pagination window.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    pub const MAX_PAGE_SIZE: usize = 100;

    pub fn new(page: usize, page_size: usize) -> Result<Self> {
        if page == 0 {
            return Err(EngineError::validation("page starts at 1"));
        }
        if page_size == 0 || page_size > Self::MAX_PAGE_SIZE {
            return Err(EngineError::validation(format!(
                "page_size must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn size(&self) -> usize {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
}

/// Store ports.
///
/// Every mutable entity carries a `version` stamp; `update`-shaped operations
/// are compare-and-swap on it (mismatch fails with `Conflict`, nothing is
/// written) and bump it on success. Operations taking several entities commit
/// them as one atomic unit: either every version check passes and every write
/// lands, or nothing does.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fails with `Conflict` if the order code is already taken.
    async fn insert(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, trader_id: Uuid, id: Uuid) -> Result<Option<Transaction>>;
    /// Owner-scoped listing, newest first.
    async fn list(
        &self,
        trader_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageOf<Transaction>>;
    async fn update(&self, tx: Transaction) -> Result<Transaction>;
    /// Commits a settlement: the transaction, the owner's account and, when
    /// the transaction ran through a requisite, its usage counters.
    async fn settle(
        &self,
        tx: Transaction,
        account: TraderAccount,
        requisite: Option<Requisite>,
    ) -> Result<Transaction>;
}

#[async_trait]
pub trait DisputeStore: Send + Sync {
    /// Opens a dispute and flips its parent to `Disputed` in one unit.
    /// Fails with `Conflict` if the transaction already has a dispute, so
    /// concurrent creates race to a single winner.
    async fn open(&self, dispute: Dispute, parent: Transaction) -> Result<Dispute>;
    async fn get(&self, trader_id: Uuid, id: Uuid) -> Result<Option<Dispute>>;
    /// Owner-scoped listing joined with parent-transaction summaries,
    /// newest first. Takes no page window: at most one dispute exists per
    /// transaction and most resolve within the SLA, so the working set
    /// stays small enough to return whole.
    async fn list(
        &self,
        trader_id: Uuid,
        status: Option<DisputeStatus>,
    ) -> Result<PageOf<DisputeView>>;
    async fn update(&self, dispute: Dispute) -> Result<Dispute>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, trader_id: Uuid) -> Result<Option<TraderAccount>>;
    /// Unconditional upsert, for seeding.
    async fn put(&self, account: TraderAccount) -> Result<()>;
    async fn update(&self, account: TraderAccount) -> Result<TraderAccount>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Persists a withdrawal reservation: the mutated account and the new
    /// pending wallet transaction, atomically.
    async fn reserve(
        &self,
        account: TraderAccount,
        wtx: WalletTransaction,
    ) -> Result<WalletTransaction>;
    /// Persists a reservation outcome: the finalized wallet transaction and
    /// the account it settled against, atomically.
    async fn finalize(
        &self,
        account: TraderAccount,
        wtx: WalletTransaction,
    ) -> Result<WalletTransaction>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<WalletTransaction>>;
    async fn list(&self, user_id: Uuid) -> Result<Vec<WalletTransaction>>;
}

#[async_trait]
pub trait RequisiteStore: Send + Sync {
    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Requisite>>;
    async fn put(&self, requisite: Requisite) -> Result<()>;
    async fn update(&self, requisite: Requisite) -> Result<Requisite>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: BankNotification) -> Result<()>;
    /// `user_id = None` lists across all users (back-office view),
    /// newest first.
    async fn list(
        &self,
        user_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PageOf<BankNotification>>;
    /// Flips the one mutable flag on an ingested notification.
    async fn mark_processed(&self, id: Uuid) -> Result<BankNotification>;
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type DisputeStoreBox = Box<dyn DisputeStore>;
pub type AccountStoreBox = Box<dyn AccountStore>;
pub type WalletStoreBox = Box<dyn WalletStore>;
pub type RequisiteStoreBox = Box<dyn RequisiteStore>;
pub type NotificationStoreBox = Box<dyn NotificationStore>;
