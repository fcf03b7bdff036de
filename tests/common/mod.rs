//! Shared test helpers.

#![allow(dead_code)]

use std::sync::Arc;
use vaultpilot::domain::entities::action::{Action, ActionArg};
use vaultpilot::domain::entities::recipe::Recipe;
use vaultpilot::domain::entities::position::Position;
use vaultpilot::domain::entities::strategy_template::StrategyTemplate;
use vaultpilot::domain::entities::subscription::Subscription;
use vaultpilot::domain::values::action_kind::ActionKind;
use vaultpilot::domain::values::address::Address;
use vaultpilot::domain::values::combine_mode::CombineMode;
use vaultpilot::domain::values::param_source::ParamSource;
use vaultpilot::domain::values::ratio_state::RatioState;
use vaultpilot::domain::values::trigger::{TriggerConfig, TriggerKind};
use vaultpilot::domain::values::value::Value;
use vaultpilot::infrastructure::oracles::fixed::FixedPriceOracle;
use vaultpilot::VaultPilot;

pub fn setup() -> VaultPilot {
    VaultPilot::with_providers(":memory:", Arc::new(FixedPriceOracle::default())).unwrap()
}

pub fn owner() -> Address {
    Address::new("0xowner")
}

pub fn agent() -> Address {
    Address::new("0xbot")
}

/// Opens a WETH-collateral / DAI-debt position with WETH quoted at 2000 and
/// DAI at 1.
pub fn open_weth_dai(vp: &VaultPilot, collateral: u128, debt: u128) -> Position {
    vp.set_price("WETH", 2000.0).unwrap();
    vp.set_price("DAI", 1.0).unwrap();
    vp.open_position(&owner(), "WETH", collateral, "DAI", debt)
        .unwrap()
}

/// Withdraw → sell → repay template gated by one ratio trigger. The sale
/// consumes the withdrawn amount ($1) and the repay consumes the sale
/// proceeds ($2); everything else is supplied at execution time.
pub fn register_repay_template(vp: &VaultPilot, name: &str) -> StrategyTemplate {
    vp.register_template(
        name.to_string(),
        vec![TriggerKind::Ratio],
        vec![ActionKind::Withdraw, ActionKind::Sell, ActionKind::Repay],
        vec![
            vec![
                ParamSource::RuntimeArg,
                ParamSource::RuntimeArg,
                ParamSource::RuntimeArg,
            ],
            vec![
                ParamSource::RuntimeArg,
                ParamSource::RuntimeArg,
                ParamSource::RecipeOutput { index: 1 },
            ],
            vec![ParamSource::RuntimeArg, ParamSource::RecipeOutput { index: 2 }],
        ],
    )
    .unwrap()
}

pub fn subscribe_ratio_under(
    vp: &VaultPilot,
    template_id: &str,
    position: u64,
    threshold: f64,
) -> Subscription {
    vp.subscribe(
        owner(),
        template_id,
        CombineMode::All,
        vec![vec![], vec![], vec![]],
        vec![TriggerConfig::Ratio {
            position,
            threshold,
            state: RatioState::Under,
        }],
    )
    .unwrap()
}

/// Borrows extra debt against the position to push its ratio down.
pub fn grow_debt(vp: &VaultPilot, position: u64, amount: u128) {
    let recipe = Recipe::new(
        "grow-debt",
        vec![Action::new(
            ActionKind::Borrow,
            vec![
                ActionArg::Literal(Value::Uint(position as u128)),
                ActionArg::Literal(Value::Uint(amount)),
                ActionArg::Literal(Value::Address(owner())),
            ],
        )
        .unwrap()],
    )
    .unwrap();
    vp.execute_recipe(&owner(), &recipe).unwrap();
}

/// Runtime arguments for the repay template. Piped slots still need a
/// placeholder value; the mapping replaces them with recipe outputs.
pub fn repay_args(position: u64, withdraw_amount: u128) -> Vec<Vec<Value>> {
    vec![
        vec![
            Value::Uint(position as u128),
            Value::Uint(withdraw_amount),
            Value::Address(owner()),
        ],
        vec![
            Value::Text("WETH".into()),
            Value::Text("DAI".into()),
            Value::Uint(0),
        ],
        vec![Value::Uint(position as u128), Value::Uint(0)],
    ]
}
