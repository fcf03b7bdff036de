//! Flash loan semantics: borrowed principal must be repaid within the same
//! recipe or the whole run is rejected at commit.

mod common;

use common::{open_weth_dai, owner, setup};
use vaultpilot::domain::entities::action::{Action, ActionArg};
use vaultpilot::domain::entities::recipe::Recipe;
use vaultpilot::domain::error::DomainError;
use vaultpilot::domain::values::action_kind::ActionKind;
use vaultpilot::domain::values::value::Value;

fn uint(n: u128) -> ActionArg {
    ActionArg::Literal(Value::Uint(n))
}

fn addr(a: vaultpilot::domain::values::address::Address) -> ActionArg {
    ActionArg::Literal(Value::Address(a))
}

fn token(t: &str) -> ActionArg {
    ActionArg::Literal(Value::Text(t.to_string()))
}

/// Flash-borrow DAI, clear the whole debt, free collateral, sell it, and
/// return the principal from the proceeds.
fn flash_repay_recipe(position: u64, principal: u128) -> Recipe {
    Recipe::new(
        "flash-repay",
        vec![
            Action::new(ActionKind::FlashBorrow, vec![token("DAI"), uint(principal)]).unwrap(),
            Action::new(
                ActionKind::Repay,
                vec![uint(position as u128), ActionArg::OutputRef(1)],
            )
            .unwrap(),
            Action::new(
                ActionKind::Withdraw,
                vec![uint(position as u128), uint(1), addr(owner())],
            )
            .unwrap(),
            Action::new(
                ActionKind::Sell,
                vec![token("WETH"), token("DAI"), ActionArg::OutputRef(3)],
            )
            .unwrap(),
            Action::new(ActionKind::FlashRepay, vec![token("DAI"), uint(principal)]).unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn test_flash_loan_repaid_in_unit_commits() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 1500);

    let recipe = flash_repay_recipe(position.id, 1500);
    let outputs = vp.execute_recipe(&owner(), &recipe).unwrap();

    // flash-repay produces nothing, so four output slots from five actions
    assert_eq!(
        outputs,
        vec![
            Value::Uint(1500),
            Value::Uint(1500),
            Value::Uint(1),
            Value::Uint(2000),
        ]
    );

    let after = vp.position(position.id).unwrap();
    assert_eq!(after.debt_amount, 0);
    assert_eq!(after.collateral_amount, 5);
    // 2000 sale proceeds minus the 1500 principal returned
    assert_eq!(vp.balance(&owner(), "DAI").unwrap(), 500);
}

#[test]
fn test_unreturned_principal_rejects_the_whole_recipe() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 1500);

    // Same flow, minus the flash repay.
    let recipe = Recipe::new(
        "keep-the-loan",
        vec![
            Action::new(ActionKind::FlashBorrow, vec![token("DAI"), uint(1500)]).unwrap(),
            Action::new(
                ActionKind::Repay,
                vec![uint(position.id as u128), ActionArg::OutputRef(1)],
            )
            .unwrap(),
        ],
    )
    .unwrap();

    let result = vp.execute_recipe(&owner(), &recipe);
    assert!(matches!(
        result,
        Err(DomainError::Adapter { ref step, .. }) if step == "commit"
    ));

    // Every action was rolled back, and the pool kept its principal.
    let after = vp.position(position.id).unwrap();
    assert_eq!(after.debt_amount, 1500);
    assert_eq!(vp.balance(&owner(), "DAI").unwrap(), 0);
}

#[test]
fn test_partial_flash_repay_is_not_enough() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 1500);

    let recipe = Recipe::new(
        "short-change",
        vec![
            Action::new(ActionKind::FlashBorrow, vec![token("DAI"), uint(1500)]).unwrap(),
            Action::new(
                ActionKind::Repay,
                vec![uint(position.id as u128), uint(500)],
            )
            .unwrap(),
            Action::new(ActionKind::FlashRepay, vec![token("DAI"), uint(1000)]).unwrap(),
        ],
    )
    .unwrap();

    let result = vp.execute_recipe(&owner(), &recipe);
    assert!(matches!(
        result,
        Err(DomainError::Adapter { ref step, .. }) if step == "commit"
    ));
    assert_eq!(vp.position(position.id).unwrap().debt_amount, 1500);
}

#[test]
fn test_flash_repay_cannot_exceed_outstanding_principal() {
    let vp = setup();
    open_weth_dai(&vp, 6, 1500);
    vp.set_balance(&owner(), "DAI", 5000).unwrap();

    let recipe = Recipe::new(
        "over-repay",
        vec![
            Action::new(ActionKind::FlashBorrow, vec![token("DAI"), uint(1000)]).unwrap(),
            Action::new(ActionKind::FlashRepay, vec![token("DAI"), uint(2000)]).unwrap(),
        ],
    )
    .unwrap();

    let result = vp.execute_recipe(&owner(), &recipe);
    match result {
        Err(DomainError::Adapter { step, reason }) => {
            assert!(step.contains("action 2"), "failed at the repay: {step}");
            assert!(reason.contains("exceeds outstanding"), "{reason}");
        }
        other => panic!("expected adapter failure, got {other:?}"),
    }
    // Rolled back: the borrowed 1000 never reached the owner.
    assert_eq!(vp.balance(&owner(), "DAI").unwrap(), 5000);
    assert_eq!(vp.outstanding_flash("DAI").unwrap(), 0);
}
