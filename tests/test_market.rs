//! Simulated market ledger: balances, prices, oracle sync, persistence.

mod common;

use common::{open_weth_dai, owner, setup};
use std::sync::Arc;
use vaultpilot::domain::error::DomainError;
use vaultpilot::infrastructure::oracles::fixed::FixedPriceOracle;
use vaultpilot::VaultPilot;

#[test]
fn test_balances_default_to_zero() {
    let vp = setup();
    assert_eq!(vp.balance(&owner(), "WETH").unwrap(), 0);

    vp.set_balance(&owner(), "WETH", 10).unwrap();
    assert_eq!(vp.balance(&owner(), "WETH").unwrap(), 10);
}

#[test]
fn test_quotes_must_be_finite_and_positive() {
    let vp = setup();
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let result = vp.set_price("DAI", bad);
        assert!(
            matches!(result, Err(DomainError::Parse(_))),
            "quote {bad} must be rejected"
        );
    }
    // Nothing was stored.
    assert!(matches!(
        vp.spot_price("DAI"),
        Err(DomainError::NotFound(_))
    ));
}

#[test]
fn test_spot_price_requires_a_stored_quote() {
    let vp = setup();
    assert!(matches!(
        vp.spot_price("WETH"),
        Err(DomainError::NotFound(_))
    ));

    vp.set_price("WETH", 2000.0).unwrap();
    assert_eq!(vp.spot_price("WETH").unwrap(), 2000.0);
}

#[tokio::test]
async fn test_sync_prices_pulls_from_the_oracle() {
    let oracle = FixedPriceOracle::new(vec![("WETH".to_string(), 1850.5)]);
    let vp = VaultPilot::with_providers(":memory:", Arc::new(oracle)).unwrap();

    vp.sync_prices(&["WETH".to_string()]).await.unwrap();
    assert_eq!(vp.spot_price("WETH").unwrap(), 1850.5);
}

#[tokio::test]
async fn test_sync_fails_on_unquoted_token() {
    let vp = setup();
    let result = vp.sync_prices(&["WETH".to_string()]).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[test]
fn test_unknown_position_lookup() {
    let vp = setup();
    assert!(matches!(vp.position(42), Err(DomainError::NotFound(_))));
}

#[test]
fn test_positions_listed_in_creation_order() {
    let vp = setup();
    let first = open_weth_dai(&vp, 6, 4000);
    let second = vp
        .open_position(&owner(), "WBTC", 1, "DAI", 10_000)
        .unwrap();

    let all = vp.positions().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first.id);
    assert_eq!(all[1].id, second.id);
    assert_eq!(all[1].collateral_token, "WBTC");
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("vaultpilot.db");
    let db_path = db_path.to_str().unwrap();

    let position_id;
    {
        let vp =
            VaultPilot::with_providers(db_path, Arc::new(FixedPriceOracle::default())).unwrap();
        vp.set_price("WETH", 2000.0).unwrap();
        let position = vp.open_position(&owner(), "WETH", 6, "DAI", 4000).unwrap();
        position_id = position.id;
        vp.set_balance(&owner(), "DAI", 250).unwrap();
    }

    let vp = VaultPilot::with_providers(db_path, Arc::new(FixedPriceOracle::default())).unwrap();
    let position = vp.position(position_id).unwrap();
    assert_eq!(position.collateral_amount, 6);
    assert_eq!(position.debt_amount, 4000);
    assert_eq!(vp.balance(&owner(), "DAI").unwrap(), 250);
    assert_eq!(vp.spot_price("WETH").unwrap(), 2000.0);
}

#[test]
fn test_large_amounts_round_trip_through_storage() {
    let vp = setup();
    vp.set_price("WETH", 2000.0).unwrap();
    vp.set_price("DAI", 1.0).unwrap();

    // Wei-scale integers exceed i64; storage must not truncate them.
    let amount = 5_000_000_000_000_000_000_000u128;
    let position = vp
        .open_position(&owner(), "WETH", amount, "DAI", amount)
        .unwrap();

    let stored = vp.position(position.id).unwrap();
    assert_eq!(stored.collateral_amount, amount);
    assert_eq!(stored.debt_amount, amount);

    vp.set_balance(&owner(), "DAI", u128::MAX).unwrap();
    assert_eq!(vp.balance(&owner(), "DAI").unwrap(), u128::MAX);
}
