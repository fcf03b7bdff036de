//! Subscription lifecycle — create, update, deactivate. Owner-only for
//! mutation; the executor never touches subscription state.

use crate::domain::entities::subscription::Subscription;
use crate::domain::error::DomainError;
use crate::domain::ports::subscription_store::SubscriptionStore;
use crate::domain::ports::template_store::TemplateStore;
use crate::domain::values::address::Address;
use crate::domain::values::combine_mode::CombineMode;
use crate::domain::values::trigger::TriggerConfig;
use crate::domain::values::value::Value;
use std::sync::Arc;

pub struct SubscriptionUseCase {
    templates: Arc<dyn TemplateStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl SubscriptionUseCase {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            templates,
            subscriptions,
        }
    }

    pub fn subscribe(
        &self,
        owner: Address,
        template_id: &str,
        combine: CombineMode,
        action_consts: Vec<Vec<Value>>,
        triggers: Vec<TriggerConfig>,
    ) -> Result<Subscription, DomainError> {
        let template = self
            .templates
            .get(template_id)?
            .ok_or_else(|| DomainError::UnknownTemplate(template_id.to_string()))?;
        let subscription = Subscription::new(owner, &template, combine, action_consts, triggers)?;
        self.subscriptions.insert(&subscription)?;
        Ok(subscription)
    }

    /// Replaces the owner-supplied parameters of an active subscription.
    pub fn update(
        &self,
        caller: &Address,
        id: &str,
        action_consts: Vec<Vec<Value>>,
        triggers: Vec<TriggerConfig>,
    ) -> Result<Subscription, DomainError> {
        let mut subscription = self.owned(caller, id)?;
        if !subscription.active {
            return Err(DomainError::InactiveSubscription(id.to_string()));
        }
        let template = self
            .templates
            .get(&subscription.template_id)?
            .ok_or_else(|| DomainError::UnknownTemplate(subscription.template_id.clone()))?;
        Subscription::validate_against(&template, &action_consts, &triggers)?;
        subscription.action_consts = action_consts;
        subscription.triggers = triggers;
        self.subscriptions.update(&subscription)?;
        Ok(subscription)
    }

    /// Terminal for this identifier: a new subscription must be created to resume.
    pub fn deactivate(&self, caller: &Address, id: &str) -> Result<(), DomainError> {
        let mut subscription = self.owned(caller, id)?;
        subscription.deactivate();
        self.subscriptions.update(&subscription)
    }

    pub fn get(&self, id: &str) -> Result<Subscription, DomainError> {
        self.subscriptions
            .get(id)?
            .ok_or_else(|| DomainError::UnknownSubscription(id.to_string()))
    }

    pub fn list(&self, owner: Option<&Address>) -> Result<Vec<Subscription>, DomainError> {
        self.subscriptions.list(owner)
    }

    fn owned(&self, caller: &Address, id: &str) -> Result<Subscription, DomainError> {
        let subscription = self.get(id)?;
        if subscription.owner != *caller {
            return Err(DomainError::UnauthorizedCaller(caller.to_string()));
        }
        Ok(subscription)
    }
}
