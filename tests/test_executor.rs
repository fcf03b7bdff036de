//! Strategy executor: authorization gate, state checks, trigger gate, and the
//! full trigger-to-recipe flow.

mod common;

use common::{
    agent, grow_debt, open_weth_dai, owner, register_repay_template, repay_args, setup,
    subscribe_ratio_under,
};
use vaultpilot::domain::error::DomainError;
use vaultpilot::domain::values::trigger::TriggerPayload;
use vaultpilot::domain::values::value::Value;

#[tokio::test]
async fn test_unauthorized_caller_rejected_before_anything_else() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    // Even with a satisfied trigger, an unknown caller gets nothing.
    grow_debt(&vp, position.id, 1000);
    let result = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 1),
        )
        .await;
    assert!(matches!(result, Err(DomainError::UnauthorizedCaller(_))));
    assert_eq!(vp.position(position.id).unwrap().debt_amount, 5000);
}

#[tokio::test]
async fn test_unknown_subscription() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();

    let result = vp
        .execute_strategy(&agent(), "nope", &[], &[])
        .await;
    assert!(matches!(result, Err(DomainError::UnknownSubscription(_))));
}

#[tokio::test]
async fn test_deactivated_subscription_cannot_execute() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);
    vp.deactivate(&owner(), &sub.id).unwrap();

    grow_debt(&vp, position.id, 1000);
    let result = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 1),
        )
        .await;
    assert!(matches!(result, Err(DomainError::InactiveSubscription(_))));
}

#[tokio::test]
async fn test_unsatisfied_trigger_blocks_execution_without_side_effects() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    // Ratio is a healthy 3.0.
    let result = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 1),
        )
        .await;
    assert!(matches!(result, Err(DomainError::TriggerNotSatisfied)));
    assert!(DomainError::TriggerNotSatisfied.is_retryable());

    let after = vp.position(position.id).unwrap();
    assert_eq!(after.collateral_amount, 6);
    assert_eq!(after.debt_amount, 4000);
}

#[tokio::test]
async fn test_full_repay_flow_restores_ratio() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    // 12000 / 5000 = 2.4, below threshold.
    grow_debt(&vp, position.id, 1000);
    assert!(vp.poll(&sub.id, &[TriggerPayload::empty()]).await.unwrap());

    let outputs = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 1),
        )
        .await
        .unwrap();
    // withdrew 1 WETH, sold for 2000 DAI, repaid all of it
    assert_eq!(
        outputs,
        vec![Value::Uint(1), Value::Uint(2000), Value::Uint(2000)]
    );

    let after = vp.position(position.id).unwrap();
    assert_eq!(after.collateral_amount, 5);
    assert_eq!(after.debt_amount, 3000);

    // 10000 / 3000 back above the threshold, so the trigger resets.
    let snapshot = vp.ratio(position.id).await.unwrap();
    assert!(snapshot.ratio() > 2.5);
    assert!(!vp.poll(&sub.id, &[TriggerPayload::empty()]).await.unwrap());

    // Subscription stays active for the next drawdown.
    assert!(vp.subscription(&sub.id).unwrap().active);
}

#[tokio::test]
async fn test_runtime_argument_rows_must_match_template() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);
    grow_debt(&vp, position.id, 1000);

    let mut args = repay_args(position.id, 1);
    args.pop();
    let result = vp
        .execute_strategy(&agent(), &sub.id, &[TriggerPayload::empty()], &args)
        .await;
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
    assert_eq!(vp.position(position.id).unwrap().debt_amount, 5000);
}

#[tokio::test]
async fn test_revoked_agent_loses_access() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);
    grow_debt(&vp, position.id, 1000);

    vp.revoke_agent(&agent()).unwrap();
    let result = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 1),
        )
        .await;
    assert!(matches!(result, Err(DomainError::UnauthorizedCaller(_))));
}

#[tokio::test]
async fn test_recipe_failure_leaves_subscription_active_and_state_intact() {
    let vp = setup();
    vp.allow_agent(&agent()).unwrap();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);
    grow_debt(&vp, position.id, 1000);

    // Withdrawing more collateral than the position holds fails the recipe.
    let result = vp
        .execute_strategy(
            &agent(),
            &sub.id,
            &[TriggerPayload::empty()],
            &repay_args(position.id, 100),
        )
        .await;
    assert!(matches!(result, Err(DomainError::Adapter { .. })));

    let after = vp.position(position.id).unwrap();
    assert_eq!(after.collateral_amount, 6);
    assert_eq!(after.debt_amount, 5000);
    assert!(vp.subscription(&sub.id).unwrap().active);
}
