use crate::config::EngineConfig;
use crate::domain::account::{
    Caller, TraderAccount, WalletTransaction, WalletTransactionKind, WalletTransactionStatus,
};
use crate::domain::money::Amount;
use crate::domain::ports::{AccountStoreBox, WalletStoreBox};
use crate::error::{EngineError, Result};
use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub kind: WalletTransactionKind,
    pub amount: Amount,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositAddress {
    pub address: String,
    pub network: String,
}

/// Wallet operations over the trader's balance ledger: withdrawal
/// reservations and their eventual confirmation or return.
pub struct Wallet {
    wallet: WalletStoreBox,
    accounts: AccountStoreBox,
    config: EngineConfig,
}

impl Wallet {
    pub fn new(wallet: WalletStoreBox, accounts: AccountStoreBox, config: EngineConfig) -> Self {
        Self {
            wallet,
            accounts,
            config,
        }
    }

    /// Reserves a withdrawal: funds move from working to pending
    /// immediately, and a `Pending` wallet transaction records the request.
    ///
    /// The balance check and the move commit as one compare-and-swap, so of
    /// two requests racing over the same balance the loser is rejected
    /// instead of overdrawing.
    pub async fn request_withdrawal(
        &self,
        caller: &Caller,
        request: WithdrawalRequest,
    ) -> Result<WalletTransaction> {
        if request.kind != WalletTransactionKind::Withdraw {
            return Err(EngineError::validation("invalid wallet transaction type"));
        }
        let address = request.address.trim();
        if address.is_empty() {
            return Err(EngineError::validation("withdrawal address is required"));
        }

        let mut account = self
            .accounts
            .get(caller.user_id)
            .await?
            .unwrap_or_else(|| TraderAccount::new(caller.user_id));
        account.reserve(request.amount.value())?;

        let wtx =
            WalletTransaction::withdrawal(caller.user_id, request.amount.value(), address.into());
        let wtx = self.wallet.reserve(account, wtx).await?;
        tracing::info!(wallet_tx = %wtx.id, amount = %wtx.amount, "withdrawal reserved");
        Ok(wtx)
    }

    /// External settlement confirmed: the reservation leaves the ledger.
    pub async fn confirm_withdrawal(&self, caller: &Caller, id: Uuid) -> Result<WalletTransaction> {
        self.finalize(caller, id, WalletTransactionStatus::Completed)
            .await
    }

    /// External settlement failed or was cancelled: the reservation returns
    /// to the spendable pool.
    pub async fn cancel_withdrawal(
        &self,
        caller: &Caller,
        id: Uuid,
        outcome: WalletTransactionStatus,
    ) -> Result<WalletTransaction> {
        if !matches!(
            outcome,
            WalletTransactionStatus::Failed | WalletTransactionStatus::Cancelled
        ) {
            return Err(EngineError::validation(
                "cancellation outcome must be failed or cancelled",
            ));
        }
        self.finalize(caller, id, outcome).await
    }

    async fn finalize(
        &self,
        caller: &Caller,
        id: Uuid,
        outcome: WalletTransactionStatus,
    ) -> Result<WalletTransaction> {
        let mut wtx = self
            .wallet
            .get(caller.user_id, id)
            .await?
            .ok_or(EngineError::NotFound)?;
        if wtx.status != WalletTransactionStatus::Pending {
            return Err(EngineError::validation("withdrawal is already finalized"));
        }

        // The reservation created the account, so it must exist.
        let mut account = self
            .accounts
            .get(wtx.user_id)
            .await?
            .ok_or(EngineError::conflict("no account behind reservation"))?;
        match outcome {
            WalletTransactionStatus::Completed => {
                account.settle_reserved(wtx.amount)?;
                wtx.completed_at = Some(Utc::now());
            }
            WalletTransactionStatus::Failed | WalletTransactionStatus::Cancelled => {
                account.restore_reserved(wtx.amount)?;
            }
            WalletTransactionStatus::Pending => unreachable!("finalize is never called with pending"),
        }
        wtx.status = outcome;

        let wtx = self.wallet.finalize(account, wtx).await?;
        tracing::info!(wallet_tx = %wtx.id, outcome = ?wtx.status, "withdrawal finalized");
        Ok(wtx)
    }

    pub fn deposit_address(&self) -> DepositAddress {
        DepositAddress {
            address: self.config.deposit_address.clone(),
            network: self.config.deposit_network.clone(),
        }
    }

    pub async fn transactions(&self, caller: &Caller) -> Result<Vec<WalletTransaction>> {
        self.wallet.list(caller.user_id).await
    }
}
