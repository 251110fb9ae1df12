mod common;

use common::{engine, payin, payout, requisite_for, seed_account};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use tradepay_core::domain::account::Caller;
use tradepay_core::domain::ports::{
    AccountStore, PageRequest, RequisiteStore, TransactionFilter, TransactionStore,
};
use tradepay_core::domain::transaction::{TransactionKind, TransactionStatus};
use tradepay_core::error::EngineError;
use uuid::Uuid;

#[tokio::test]
async fn test_created_transaction_starts_pending() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(5000.00), dec!(52.356021)))
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.trader_id, caller.user_id);
    assert!(tx.order_code.starts_with("ORD-"));
    assert_eq!(tx.order_code.len(), 12);
    assert!(tx.completed_at.is_none());
}

#[tokio::test]
async fn test_order_codes_stay_unique_under_concurrent_creation() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let mut handles = Vec::new();
    for _ in 0..50 {
        let ledger = engine.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.create(&caller, payin(dec!(100.00), dec!(1.00))).await
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let tx = handle.await.unwrap().unwrap();
        assert!(codes.insert(tx.order_code), "duplicate order code issued");
    }
    assert_eq!(codes.len(), 50);
}

#[tokio::test]
async fn test_get_is_scoped_to_the_owner() {
    let engine = engine();
    let owner = Caller::trader(Uuid::new_v4());
    let stranger = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&owner, payin(dec!(100.00), dec!(1.00)))
        .await
        .unwrap();

    assert!(engine.ledger.get(&owner, tx.id).await.is_ok());
    assert!(matches!(
        engine.ledger.get(&stranger, tx.id).await,
        Err(EngineError::NotFound)
    ));
}

#[tokio::test]
async fn test_completed_payin_credits_working_balance() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(5000.00), dec!(52.356021)))
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();
    let tx = engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Completed);
    assert!(tx.completed_at.is_some());
    let account = AccountStore::get(&engine.store, caller.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.working_balance, dec!(52.356021));
}

#[tokio::test]
async fn test_completed_payout_debits_working_balance() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());
    seed_account(&engine.store, caller.user_id, dec!(100)).await;

    let tx = engine
        .ledger
        .create(&caller, payout(dec!(3000.00), dec!(30.00)))
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap();

    let account = AccountStore::get(&engine.store, caller.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.working_balance, dec!(70.00));
}

#[tokio::test]
async fn test_payout_without_funds_stays_processing() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());
    seed_account(&engine.store, caller.user_id, dec!(10)).await;

    let tx = engine
        .ledger
        .create(&caller, payout(dec!(3000.00), dec!(30.00)))
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();

    let err = engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance { .. }));

    let stored = engine.ledger.get(&caller, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Processing);
    let account = AccountStore::get(&engine.store, caller.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.working_balance, dec!(10));
}

#[tokio::test]
async fn test_failed_transaction_moves_no_funds() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(5000.00), dec!(52.356021)))
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();
    let tx = engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Failed)
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    let account = AccountStore::get(&engine.store, caller.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.working_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_status_machine_rejects_skipping_processing() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(100.00), dec!(1.00)))
        .await
        .unwrap();

    let err = engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let stored = engine.ledger.get(&caller, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
}

#[tokio::test]
async fn test_disputed_is_not_a_direct_status_target() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(100.00), dec!(1.00)))
        .await
        .unwrap();

    assert!(matches!(
        engine
            .ledger
            .update_status(&caller, tx.id, TransactionStatus::Disputed)
            .await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn test_terminal_transaction_admits_no_further_transition() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    let tx = engine
        .ledger
        .create(&caller, payin(dec!(100.00), dec!(1.00)))
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Cancelled)
        .await
        .unwrap();

    assert!(matches!(
        engine
            .ledger
            .update_status(&caller, tx.id, TransactionStatus::Processing)
            .await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn test_completion_records_requisite_usage() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());
    let requisite = requisite_for(caller.user_id);
    let requisite_id = requisite.id;
    RequisiteStore::put(&engine.store, requisite).await.unwrap();

    let mut new_tx = payin(dec!(5000.00), dec!(52.356021));
    new_tx.requisite_id = Some(requisite_id);
    let tx = engine.ledger.create(&caller, new_tx).await.unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap();

    let stored = RequisiteStore::get(&engine.store, caller.user_id, requisite_id)
        .await
        .unwrap()
        .unwrap();
    // Usage is accounted in fiat, the balance in settlement currency.
    assert_eq!(stored.daily_used, dec!(5000.00));
    assert_eq!(stored.monthly_used, dec!(5000.00));
    assert_eq!(stored.transactions_count, 1);
    assert!(stored.last_used_at.is_some());
}

#[tokio::test]
async fn test_limit_rejection_blocks_completion_and_changes_nothing() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());
    let mut requisite = requisite_for(caller.user_id);
    requisite.daily_used = dec!(290000);
    requisite.monthly_used = dec!(290000);
    let requisite_id = requisite.id;
    RequisiteStore::put(&engine.store, requisite).await.unwrap();

    let mut new_tx = payin(dec!(20000.00), dec!(200.00));
    new_tx.requisite_id = Some(requisite_id);
    let tx = engine.ledger.create(&caller, new_tx).await.unwrap();
    engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Processing)
        .await
        .unwrap();

    let err = engine
        .ledger
        .update_status(&caller, tx.id, TransactionStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::LimitExceeded { window: "daily", .. }
    ));

    let stored = engine.ledger.get(&caller, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Processing);
    let requisite = RequisiteStore::get(&engine.store, caller.user_id, requisite_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(requisite.daily_used, dec!(290000));
    assert_eq!(requisite.transactions_count, 0);
    assert!(
        AccountStore::get(&engine.store, caller.user_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_list_filters_by_kind_and_paginates() {
    let engine = engine();
    let caller = Caller::trader(Uuid::new_v4());

    for _ in 0..3 {
        engine
            .ledger
            .create(&caller, payin(dec!(100.00), dec!(1.00)))
            .await
            .unwrap();
    }
    engine
        .ledger
        .create(&caller, payout(dec!(100.00), dec!(1.00)))
        .await
        .unwrap();

    let filter = TransactionFilter {
        kind: Some(TransactionKind::Payin),
        status: None,
    };
    let page = engine
        .ledger
        .list(&caller, filter, PageRequest::new(1, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|tx| tx.kind == TransactionKind::Payin));

    // Stores never leak another trader's rows.
    let stranger = Caller::trader(Uuid::new_v4());
    let page = TransactionStore::list(
        &engine.store,
        stranger.user_id,
        TransactionFilter::default(),
        PageRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(page.total, 0);
}
