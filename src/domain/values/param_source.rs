use serde::{Deserialize, Serialize};

/// Where one action argument slot gets its value when a subscription's
/// recipe is assembled for execution.
///
/// Each template carries one row of these per action; the row length equals
/// the action kind's input arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ParamSource {
    /// Taken verbatim from the owner-approved arguments supplied at execution time.
    RuntimeArg,
    /// Taken from the subscription's constant values for this action.
    SubscriptionConst { slot: usize },
    /// Piped from the recipe output buffer (1-based slot, earlier actions only).
    RecipeOutput { index: usize },
    /// Taken from a trigger's runtime payload.
    TriggerPayload { trigger: usize, index: usize },
}
