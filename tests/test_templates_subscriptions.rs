//! Template registration and subscription lifecycle.

mod common;

use common::{open_weth_dai, owner, register_repay_template, setup, subscribe_ratio_under};
use vaultpilot::domain::error::DomainError;
use vaultpilot::domain::values::action_kind::ActionKind;
use vaultpilot::domain::values::address::Address;
use vaultpilot::domain::values::combine_mode::CombineMode;
use vaultpilot::domain::values::param_source::ParamSource;
use vaultpilot::domain::values::ratio_state::RatioState;
use vaultpilot::domain::values::trigger::{TriggerConfig, TriggerKind};
use vaultpilot::domain::values::value::Value;

#[test]
fn test_register_and_fetch_template() {
    let vp = setup();
    let template = register_repay_template(&vp, "repay");

    let fetched = vp.template(&template.id).unwrap();
    assert_eq!(fetched, template);
    assert_eq!(vp.templates().unwrap().len(), 1);
}

#[test]
fn test_template_names_are_unique() {
    let vp = setup();
    register_repay_template(&vp, "repay");
    let result = vp.register_template(
        "repay".to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Repay],
        vec![vec![ParamSource::RuntimeArg, ParamSource::RuntimeArg]],
    );
    assert!(matches!(result, Err(DomainError::DuplicateTemplate(name)) if name == "repay"));
}

#[test]
fn test_unknown_template_lookup() {
    let vp = setup();
    assert!(matches!(
        vp.template("nope"),
        Err(DomainError::UnknownTemplate(_))
    ));
}

#[test]
fn test_mapping_row_count_must_match_actions() {
    let vp = setup();
    let result = vp.register_template(
        "short".to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Withdraw, ActionKind::Repay],
        vec![vec![
            ParamSource::RuntimeArg,
            ParamSource::RuntimeArg,
            ParamSource::RuntimeArg,
        ]],
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
}

#[test]
fn test_mapping_row_must_match_action_arity() {
    let vp = setup();
    let result = vp.register_template(
        "wide".to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Repay],
        vec![vec![
            ParamSource::RuntimeArg,
            ParamSource::RuntimeArg,
            ParamSource::RuntimeArg,
        ]],
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
}

#[test]
fn test_mapping_output_reference_checked_at_registration() {
    let vp = setup();
    // First action cannot consume an output nothing has produced yet.
    let result = vp.register_template(
        "premature".to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Repay],
        vec![vec![
            ParamSource::RuntimeArg,
            ParamSource::RecipeOutput { index: 1 },
        ]],
    );
    assert!(matches!(
        result,
        Err(DomainError::UnresolvedReference { action: 1, slot: 1 })
    ));
}

#[test]
fn test_mapping_payload_reference_checked_against_trigger_arity() {
    let vp = setup();
    // Ratio triggers carry no payload, so slot 0 does not exist.
    let result = vp.register_template(
        "no-payload".to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Repay],
        vec![vec![
            ParamSource::RuntimeArg,
            ParamSource::TriggerPayload {
                trigger: 0,
                index: 0,
            },
        ]],
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));

    // A time trigger's single payload slot is addressable.
    let ok = vp.register_template(
        "timestamped".to_string(),
        vec![TriggerKind::Time],
        vec![ActionKind::Repay],
        vec![vec![
            ParamSource::RuntimeArg,
            ParamSource::TriggerPayload {
                trigger: 0,
                index: 0,
            },
        ]],
    );
    assert!(ok.is_ok());
}

#[test]
fn test_subscribe_requires_existing_template() {
    let vp = setup();
    let result = vp.subscribe(owner(), "nope", CombineMode::All, vec![], vec![]);
    assert!(matches!(result, Err(DomainError::UnknownTemplate(_))));
}

#[test]
fn test_subscription_const_rows_must_match_actions() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");

    let result = vp.subscribe(
        owner(),
        &template.id,
        CombineMode::All,
        vec![vec![]], // template has three actions
        vec![TriggerConfig::Ratio {
            position: position.id,
            threshold: 2.5,
            state: RatioState::Under,
        }],
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
}

#[test]
fn test_subscription_must_populate_const_slots() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);

    // Repay position id is pinned at subscription time.
    let template = vp
        .register_template(
            "pinned-repay".to_string(),
            vec![TriggerKind::Ratio],
            vec![ActionKind::Repay],
            vec![vec![
                ParamSource::SubscriptionConst { slot: 0 },
                ParamSource::RuntimeArg,
            ]],
        )
        .unwrap();

    let trigger = TriggerConfig::Ratio {
        position: position.id,
        threshold: 2.5,
        state: RatioState::Under,
    };

    let missing = vp.subscribe(
        owner(),
        &template.id,
        CombineMode::All,
        vec![vec![]],
        vec![trigger.clone()],
    );
    assert!(matches!(missing, Err(DomainError::ArityMismatch(_))));

    let populated = vp.subscribe(
        owner(),
        &template.id,
        CombineMode::All,
        vec![vec![Value::Uint(position.id as u128)]],
        vec![trigger],
    );
    assert!(populated.is_ok());
}

#[test]
fn test_subscription_trigger_kinds_must_match_template_order() {
    let vp = setup();
    let template = register_repay_template(&vp, "repay");

    let result = vp.subscribe(
        owner(),
        &template.id,
        CombineMode::All,
        vec![vec![], vec![], vec![]],
        vec![TriggerConfig::Time {
            after: chrono::Utc::now(),
        }],
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
}

#[test]
fn test_update_replaces_parameters() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    let updated = vp
        .update_subscription(
            &owner(),
            &sub.id,
            vec![vec![], vec![], vec![]],
            vec![TriggerConfig::Ratio {
                position: position.id,
                threshold: 1.8,
                state: RatioState::Under,
            }],
        )
        .unwrap();

    assert_eq!(updated.id, sub.id);
    let stored = vp.subscription(&sub.id).unwrap();
    assert!(matches!(
        stored.triggers[0],
        TriggerConfig::Ratio { threshold, .. } if threshold == 1.8
    ));
}

#[test]
fn test_update_revalidates_against_template() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    let result = vp.update_subscription(
        &owner(),
        &sub.id,
        vec![vec![], vec![], vec![]],
        vec![], // trigger count no longer matches the template
    );
    assert!(matches!(result, Err(DomainError::ArityMismatch(_))));
}

#[test]
fn test_only_owner_may_update_or_deactivate() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    let intruder = Address::new("0xintruder");
    let update = vp.update_subscription(
        &intruder,
        &sub.id,
        vec![vec![], vec![], vec![]],
        sub.triggers.clone(),
    );
    assert!(matches!(update, Err(DomainError::UnauthorizedCaller(_))));

    let deactivate = vp.deactivate(&intruder, &sub.id);
    assert!(matches!(
        deactivate,
        Err(DomainError::UnauthorizedCaller(_))
    ));
    assert!(vp.subscription(&sub.id).unwrap().active);
}

#[test]
fn test_deactivation_is_terminal() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    let sub = subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    vp.deactivate(&owner(), &sub.id).unwrap();
    assert!(!vp.subscription(&sub.id).unwrap().active);

    // No path back: updates are refused on a deactivated subscription.
    let result = vp.update_subscription(
        &owner(),
        &sub.id,
        vec![vec![], vec![], vec![]],
        sub.triggers.clone(),
    );
    assert!(matches!(result, Err(DomainError::InactiveSubscription(_))));
}

#[test]
fn test_list_subscriptions_filters_by_owner() {
    let vp = setup();
    let position = open_weth_dai(&vp, 6, 4000);
    let template = register_repay_template(&vp, "repay");
    subscribe_ratio_under(&vp, &template.id, position.id, 2.5);

    let other = Address::new("0xother");
    vp.subscribe(
        other.clone(),
        &template.id,
        CombineMode::All,
        vec![vec![], vec![], vec![]],
        vec![TriggerConfig::Ratio {
            position: position.id,
            threshold: 2.0,
            state: RatioState::Under,
        }],
    )
    .unwrap();

    assert_eq!(vp.subscriptions(None).unwrap().len(), 2);
    assert_eq!(vp.subscriptions(Some(&owner())).unwrap().len(), 1);
    assert_eq!(vp.subscriptions(Some(&other)).unwrap().len(), 1);
}
