use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::error::DomainError;
use crate::domain::values::address::Address;
use crate::domain::values::combine_mode::CombineMode;
use crate::domain::values::param_source::ParamSource;
use crate::domain::values::trigger::TriggerConfig;
use crate::domain::values::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A template instantiated with one owner's concrete parameters.
///
/// Created by the owner, executed on the owner's behalf by allowlisted
/// agents. Only the owner may update or deactivate it, and deactivation is
/// terminal for the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub owner: Address,
    pub template_id: String,
    pub combine: CombineMode,
    /// One row of constants per template action, indexed by
    /// `ParamSource::SubscriptionConst` cells.
    pub action_consts: Vec<Vec<Value>>,
    pub triggers: Vec<TriggerConfig>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(
        owner: Address,
        template: &StrategyTemplate,
        combine: CombineMode,
        action_consts: Vec<Vec<Value>>,
        triggers: Vec<TriggerConfig>,
    ) -> Result<Self, DomainError> {
        Self::validate_against(template, &action_consts, &triggers)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner,
            template_id: template.id.clone(),
            combine,
            action_consts,
            triggers,
            active: true,
            created_at: Utc::now(),
        })
    }

    /// Checks that owner-supplied parameters fit the template: one constants
    /// row per action, every `SubscriptionConst` slot populated, and trigger
    /// configs matching the declared kinds in order.
    pub fn validate_against(
        template: &StrategyTemplate,
        action_consts: &[Vec<Value>],
        triggers: &[TriggerConfig],
    ) -> Result<(), DomainError> {
        if action_consts.len() != template.action_kinds.len() {
            return Err(DomainError::ArityMismatch(format!(
                "template '{}' has {} actions, got {} constant rows",
                template.name,
                template.action_kinds.len(),
                action_consts.len()
            )));
        }
        for (i, row) in template.param_mapping.iter().enumerate() {
            for cell in row {
                if let ParamSource::SubscriptionConst { slot } = cell {
                    if *slot >= action_consts[i].len() {
                        return Err(DomainError::ArityMismatch(format!(
                            "action {} expects subscription constant slot {slot}, row has {} values",
                            i + 1,
                            action_consts[i].len()
                        )));
                    }
                }
            }
        }
        if triggers.len() != template.trigger_kinds.len() {
            return Err(DomainError::ArityMismatch(format!(
                "template '{}' declares {} triggers, got {}",
                template.name,
                template.trigger_kinds.len(),
                triggers.len()
            )));
        }
        for (i, (config, kind)) in triggers.iter().zip(&template.trigger_kinds).enumerate() {
            if config.kind() != *kind {
                return Err(DomainError::ArityMismatch(format!(
                    "trigger {} must be of kind {kind}, got {}",
                    i + 1,
                    config.kind()
                )));
            }
        }
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
