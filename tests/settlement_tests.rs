mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use backoffice::config::AppConfig;
use backoffice::errors::LedgerError;
use backoffice::ledger::{PayoutPolicy, SettlementEngine};
use backoffice::models::{Outcome, PositionStatus};

fn engine(pool: &sqlx::PgPool) -> SettlementEngine {
    SettlementEngine::new(pool.clone(), &AppConfig::with_database_url(common::test_database_url()))
}

#[tokio::test]
async fn test_win_credits_stake_plus_net_profit() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(5), dec!(100)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::minutes(5)).await;

    let closed = engine(&pool)
        .settle_position(pos.id, Outcome::Win)
        .await
        .expect("settlement should succeed");

    assert_eq!(closed.status, PositionStatus::Closed);
    assert_eq!(closed.result, Some(Outcome::Win));
    assert_eq!(closed.actual_profit, Some(dec!(9.9)));
    assert_eq!(closed.exit_price, Some(closed.entry_price));
    assert!(closed.closed_at.is_some());

    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.available, dec!(114.9));
    assert_eq!(wallet.locked, dec!(0));

    // Re-query to be sure the state was persisted
    let stored = common::fetch_position(&pool, pos.id).await;
    assert_eq!(stored.status, PositionStatus::Closed);
    assert_eq!(stored.actual_profit, Some(dec!(9.9)));
}

#[tokio::test]
async fn test_loss_recovers_principal_less_profit_and_fee() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(0), dec!(150)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::minutes(5)).await;

    let closed = engine(&pool).settle_position(pos.id, Outcome::Loss).await.unwrap();

    assert_eq!(closed.result, Some(Outcome::Loss));
    assert_eq!(closed.actual_profit, Some(dec!(-10.1)));

    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.available, dec!(89.9));
    assert_eq!(wallet.locked, dec!(50));
}

#[tokio::test]
async fn test_missing_wallet_is_created() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    let pos = common::seed_position(&pool, user, dec!(20), None, Duration::minutes(5)).await;

    assert!(common::fetch_wallet(&pool, user).await.is_none());

    let closed = engine(&pool).settle_position(pos.id, Outcome::Win).await.unwrap();
    // Even money less 1% fee on the profit
    assert_eq!(closed.actual_profit, Some(dec!(19.8)));

    let wallet = common::fetch_wallet(&pool, user).await.expect("wallet should exist");
    assert_eq!(wallet.available, dec!(39.8));
    assert_eq!(wallet.locked, Decimal::ZERO);
}

#[tokio::test]
async fn test_balances_never_go_negative() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(0), dec!(0)).await;
    // Even-money loss debits 1% beyond the stake
    let pos = common::seed_position(&pool, user, dec!(100), None, Duration::minutes(5)).await;

    let closed = engine(&pool).settle_position(pos.id, Outcome::Loss).await.unwrap();
    assert_eq!(closed.actual_profit, Some(dec!(-101)));

    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.available, Decimal::ZERO);
    assert_eq!(wallet.locked, Decimal::ZERO);
}

#[tokio::test]
async fn test_closed_position_is_rejected_and_untouched() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(0), dec!(200)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::minutes(5)).await;
    let engine = engine(&pool);

    engine.settle_position(pos.id, Outcome::Win).await.unwrap();
    let wallet_before = common::fetch_wallet(&pool, user).await.unwrap();

    let err = engine.settle_position(pos.id, Outcome::Loss).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)), "got {err:?}");

    let wallet_after = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet_after.available, wallet_before.available);
    assert_eq!(wallet_after.locked, wallet_before.locked);

    let stored = common::fetch_position(&pool, pos.id).await;
    assert_eq!(stored.result, Some(Outcome::Win));
}

#[tokio::test]
async fn test_closed_and_expired_position_reports_invalid_state() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    let pos = common::seed_position(&pool, user, dec!(10), None, Duration::minutes(5)).await;
    let engine = engine(&pool);

    engine.settle_position(pos.id, Outcome::Win).await.unwrap();

    let later = Utc::now() + Duration::hours(1);
    let err = engine
        .settle_position_at(pos.id, Outcome::Loss, later)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidState(_)), "got {err:?}");
}

#[tokio::test]
async fn test_expired_position_is_rejected_and_untouched() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(1), dec!(100)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::seconds(-1)).await;

    let err = engine(&pool).settle_position(pos.id, Outcome::Win).await.unwrap_err();
    assert!(matches!(err, LedgerError::Expired(_)), "got {err:?}");

    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.available, dec!(1));
    assert_eq!(wallet.locked, dec!(100));

    let stored = common::fetch_position(&pool, pos.id).await;
    assert_eq!(stored.status, PositionStatus::Open);
    assert!(stored.result.is_none());
}

#[tokio::test]
async fn test_expiry_is_judged_against_supplied_clock() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    let pos = common::seed_position(&pool, user, dec!(10), None, Duration::minutes(5)).await;

    let err = engine(&pool)
        .settle_position_at(pos.id, Outcome::Win, pos.expires_at)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Expired(_)));

    let closed = engine(&pool)
        .settle_position_at(pos.id, Outcome::Win, pos.expires_at - Duration::seconds(1))
        .await
        .unwrap();
    assert!(closed.closed_at.unwrap() < Utc::now());
}

#[tokio::test]
async fn test_unknown_position_is_not_found() {
    let pool = common::setup_test_db().await;

    let err = engine(&pool).settle_position(i32::MAX, Outcome::Win).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_settlements_only_one_wins() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(0), dec!(100)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::minutes(5)).await;

    let a = engine(&pool);
    let b = engine(&pool);
    let (ra, rb) = tokio::join!(
        a.settle_position(pos.id, Outcome::Win),
        b.settle_position(pos.id, Outcome::Loss),
    );

    let results = [ra, rb];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let invalid_state = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InvalidState(_))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(invalid_state, 1);

    // Exactly one settlement was booked
    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.locked, Decimal::ZERO);
    assert!(wallet.available == dec!(109.9) || wallet.available == dec!(89.9));
}

#[tokio::test]
async fn test_legacy_flat_policy() {
    let pool = common::setup_test_db().await;
    let user = common::seed_user(&pool).await;
    common::seed_wallet(&pool, user, dec!(0), dec!(100)).await;
    let pos = common::seed_position(&pool, user, dec!(100), Some(dec!(10)), Duration::minutes(5)).await;

    let mut config = AppConfig::with_database_url(common::test_database_url());
    config.payout_policy = PayoutPolicy::LegacyFlat;
    let engine = SettlementEngine::new(pool.clone(), &config);

    let closed = engine.settle_position(pos.id, Outcome::Win).await.unwrap();
    assert_eq!(closed.actual_profit, Some(dec!(100)));

    let wallet = common::fetch_wallet(&pool, user).await.unwrap();
    assert_eq!(wallet.available, dec!(200));
    assert_eq!(wallet.locked, Decimal::ZERO);
}
