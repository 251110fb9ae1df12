#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tradepay_core::application::disputes::DisputeResolver;
use tradepay_core::application::inbox::NotificationInbox;
use tradepay_core::application::ledger::TransactionLedger;
use tradepay_core::application::wallet::Wallet;
use tradepay_core::config::EngineConfig;
use tradepay_core::domain::account::TraderAccount;
use tradepay_core::domain::money::Amount;
use tradepay_core::domain::notification::NewBankNotification;
use tradepay_core::domain::ports::AccountStore;
use tradepay_core::domain::requisite::{Requisite, RequisiteKind};
use tradepay_core::domain::transaction::{NewTransaction, PaymentMethod, TransactionKind};
use tradepay_core::infrastructure::in_memory::InMemoryStore;
use uuid::Uuid;

pub struct TestEngine {
    pub store: InMemoryStore,
    pub ledger: Arc<TransactionLedger>,
    pub disputes: Arc<DisputeResolver>,
    pub wallet: Wallet,
    pub inbox: NotificationInbox,
}

/// Wires every service against one shared in-memory store, the way the
/// binary would against a real one.
pub fn engine() -> TestEngine {
    let store = InMemoryStore::new();
    let ledger = Arc::new(TransactionLedger::new(
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store.clone()),
    ));
    let disputes = Arc::new(DisputeResolver::new(Box::new(store.clone()), ledger.clone()));
    let wallet = Wallet::new(
        Box::new(store.clone()),
        Box::new(store.clone()),
        EngineConfig::default(),
    );
    let inbox = NotificationInbox::new(Box::new(store.clone()));
    TestEngine {
        store,
        ledger,
        disputes,
        wallet,
        inbox,
    }
}

pub fn payin(amount: Decimal, amount_settlement: Decimal) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Payin,
        amount: Amount::new(amount).unwrap(),
        amount_settlement: Amount::new(amount_settlement).unwrap(),
        method: PaymentMethod::Card,
        requisite_id: None,
        client_ref: None,
        direction: None,
    }
}

pub fn payout(amount: Decimal, amount_settlement: Decimal) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Payout,
        ..payin(amount, amount_settlement)
    }
}

pub async fn seed_account(store: &InMemoryStore, trader_id: Uuid, working: Decimal) {
    let mut account = TraderAccount::new(trader_id);
    account.working_balance = working;
    AccountStore::put(store, account).await.unwrap();
}

pub fn requisite_for(owner_id: Uuid) -> Requisite {
    Requisite::new(
        owner_id,
        RequisiteKind::Card,
        "Sberbank".into(),
        "IVAN IVANOV".into(),
    )
}

pub fn notification(title: &str, text: &str) -> NewBankNotification {
    NewBankNotification {
        app_package: "com.sberbank.android".into(),
        app_name: Some("СберБанк".into()),
        title: title.into(),
        text: text.into(),
        posted_at: Utc::now(),
        raw_data: None,
    }
}
