//! A strategy template binds trigger kinds and an ordered action list into a
//! reusable definition. Templates are registered once, are immutable, and
//! may back any number of subscriptions.

use crate::domain::error::DomainError;
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::param_source::ParamSource;
use crate::domain::values::trigger::TriggerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTemplate {
    pub id: String,
    pub name: String,
    pub trigger_kinds: Vec<TriggerKind>,
    pub action_kinds: Vec<ActionKind>,
    /// One row per action; each cell says where that argument slot comes from.
    pub param_mapping: Vec<Vec<ParamSource>>,
    pub created_at: DateTime<Utc>,
}

impl StrategyTemplate {
    pub fn new(
        name: String,
        trigger_kinds: Vec<TriggerKind>,
        action_kinds: Vec<ActionKind>,
        param_mapping: Vec<Vec<ParamSource>>,
    ) -> Result<Self, DomainError> {
        if param_mapping.len() != action_kinds.len() {
            return Err(DomainError::ArityMismatch(format!(
                "template '{name}' declares {} actions but {} mapping rows",
                action_kinds.len(),
                param_mapping.len()
            )));
        }

        let mut produced = 0usize;
        for (i, (kind, row)) in action_kinds.iter().zip(&param_mapping).enumerate() {
            if row.len() != kind.input_arity() {
                return Err(DomainError::ArityMismatch(format!(
                    "template '{name}' action {} ({kind}) takes {} arguments, mapping row has {}",
                    i + 1,
                    kind.input_arity(),
                    row.len()
                )));
            }
            for cell in row {
                match cell {
                    ParamSource::RecipeOutput { index } => {
                        // Bounds are checked here, at registration, so a piped
                        // slot can never point past what earlier actions produce.
                        if *index == 0 || *index > produced {
                            return Err(DomainError::UnresolvedReference {
                                action: i + 1,
                                slot: *index,
                            });
                        }
                    }
                    ParamSource::TriggerPayload { trigger, index } => {
                        let kind = trigger_kinds.get(*trigger).ok_or_else(|| {
                            DomainError::ArityMismatch(format!(
                                "template '{name}' references payload of trigger {trigger}, only {} declared",
                                trigger_kinds.len()
                            ))
                        })?;
                        if *index >= kind.payload_arity() {
                            return Err(DomainError::ArityMismatch(format!(
                                "template '{name}' references payload slot {index} of a {kind} trigger (arity {})",
                                kind.payload_arity()
                            )));
                        }
                    }
                    ParamSource::RuntimeArg | ParamSource::SubscriptionConst { .. } => {}
                }
            }
            produced += kind.output_arity();
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            trigger_kinds,
            action_kinds,
            param_mapping,
            created_at: Utc::now(),
        })
    }
}
