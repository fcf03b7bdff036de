//! Strategy executor — the authorization-checked orchestrator that gates a
//! subscription's recipe behind its triggers and delegates to the engine.

use crate::application::recipe_engine::RecipeEngine;
use crate::application::trigger_eval::TriggerEvaluator;
use crate::domain::entities::action::{Action, ActionArg};
use crate::domain::entities::recipe::Recipe;
use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::entities::subscription::Subscription;
use crate::domain::error::DomainError;
use crate::domain::ports::agent_registry::AgentRegistry;
use crate::domain::ports::subscription_store::SubscriptionStore;
use crate::domain::ports::template_store::TemplateStore;
use crate::domain::values::address::Address;
use crate::domain::values::param_source::ParamSource;
use crate::domain::values::trigger::TriggerPayload;
use crate::domain::values::value::Value;
use std::sync::Arc;

pub struct StrategyExecutor {
    agents: Arc<dyn AgentRegistry>,
    subscriptions: Arc<dyn SubscriptionStore>,
    templates: Arc<dyn TemplateStore>,
    evaluator: TriggerEvaluator,
    engine: RecipeEngine,
}

impl StrategyExecutor {
    pub fn new(
        agents: Arc<dyn AgentRegistry>,
        subscriptions: Arc<dyn SubscriptionStore>,
        templates: Arc<dyn TemplateStore>,
        evaluator: TriggerEvaluator,
        engine: RecipeEngine,
    ) -> Self {
        Self {
            agents,
            subscriptions,
            templates,
            evaluator,
            engine,
        }
    }

    /// Runs one execution attempt on behalf of the subscription's owner.
    ///
    /// Validation happens strictly before any external effect: caller
    /// allowlist, subscription lookup and status, then a fresh trigger
    /// evaluation. An unsatisfied trigger is a routine polling outcome, not
    /// an alarm. Recipe failure propagates unchanged; the subscription stays
    /// active either way.
    pub async fn execute(
        &self,
        caller: &Address,
        subscription_id: &str,
        trigger_payloads: &[TriggerPayload],
        action_args: &[Vec<Value>],
    ) -> Result<Vec<Value>, DomainError> {
        if !self.agents.is_authorized(caller)? {
            return Err(DomainError::UnauthorizedCaller(caller.to_string()));
        }

        let subscription = self
            .subscriptions
            .get(subscription_id)?
            .ok_or_else(|| DomainError::UnknownSubscription(subscription_id.to_string()))?;
        if !subscription.active {
            return Err(DomainError::InactiveSubscription(subscription_id.to_string()));
        }
        let template = self
            .templates
            .get(&subscription.template_id)?
            .ok_or_else(|| DomainError::UnknownTemplate(subscription.template_id.clone()))?;

        let satisfied = self
            .evaluator
            .evaluate_all(&subscription.triggers, trigger_payloads, subscription.combine)
            .await?;
        if !satisfied {
            return Err(DomainError::TriggerNotSatisfied);
        }

        let recipe = build_recipe(&template, &subscription, trigger_payloads, action_args)?;
        self.engine.execute(&recipe, &subscription.owner)
    }

    /// Evaluates the combined trigger state without executing. Monitoring
    /// read, no authorization required.
    pub async fn poll(
        &self,
        subscription_id: &str,
        trigger_payloads: &[TriggerPayload],
    ) -> Result<bool, DomainError> {
        let subscription = self
            .subscriptions
            .get(subscription_id)?
            .ok_or_else(|| DomainError::UnknownSubscription(subscription_id.to_string()))?;
        self.evaluator
            .evaluate_all(&subscription.triggers, trigger_payloads, subscription.combine)
            .await
    }
}

/// Assembles the bound recipe: template action kinds, the mapping table, the
/// subscription's constants, trigger payload values, and the owner-approved
/// runtime arguments supplied for this attempt.
fn build_recipe(
    template: &StrategyTemplate,
    subscription: &Subscription,
    trigger_payloads: &[TriggerPayload],
    action_args: &[Vec<Value>],
) -> Result<Recipe, DomainError> {
    if action_args.len() != template.action_kinds.len() {
        return Err(DomainError::ArityMismatch(format!(
            "template '{}' has {} actions, got {} argument rows",
            template.name,
            template.action_kinds.len(),
            action_args.len()
        )));
    }

    let mut actions = Vec::with_capacity(template.action_kinds.len());
    for (i, (kind, row)) in template
        .action_kinds
        .iter()
        .zip(&template.param_mapping)
        .enumerate()
    {
        let runtime = &action_args[i];
        if runtime.len() != kind.input_arity() {
            return Err(DomainError::ArityMismatch(format!(
                "action {} ({kind}) takes {} arguments, got {}",
                i + 1,
                kind.input_arity(),
                runtime.len()
            )));
        }

        let mut args = Vec::with_capacity(row.len());
        for (j, cell) in row.iter().enumerate() {
            let arg = match cell {
                ParamSource::RuntimeArg => ActionArg::Literal(runtime[j].clone()),
                ParamSource::SubscriptionConst { slot } => {
                    let value = subscription.action_consts[i].get(*slot).ok_or_else(|| {
                        DomainError::ArityMismatch(format!(
                            "action {} missing subscription constant slot {slot}",
                            i + 1
                        ))
                    })?;
                    ActionArg::Literal(value.clone())
                }
                ParamSource::RecipeOutput { index } => ActionArg::OutputRef(*index),
                ParamSource::TriggerPayload { trigger, index } => {
                    let value = trigger_payloads
                        .get(*trigger)
                        .and_then(|p| p.values.get(*index))
                        .ok_or_else(|| {
                            DomainError::ArityMismatch(format!(
                                "action {} references missing payload slot {index} of trigger {trigger}",
                                i + 1
                            ))
                        })?;
                    ActionArg::Literal(value.clone())
                }
            };
            args.push(arg);
        }
        actions.push(Action::new(*kind, args)?);
    }

    Recipe::new(template.name.clone(), actions)
}
