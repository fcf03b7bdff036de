use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::error::DomainError;
use crate::domain::ports::protocol_adapter::AdapterRegistry;
use crate::domain::ports::template_store::TemplateStore;
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::param_source::ParamSource;
use crate::domain::values::trigger::TriggerKind;
use std::sync::Arc;

pub struct RegisterTemplateUseCase {
    store: Arc<dyn TemplateStore>,
    adapters: Arc<AdapterRegistry>,
}

impl RegisterTemplateUseCase {
    pub fn new(store: Arc<dyn TemplateStore>, adapters: Arc<AdapterRegistry>) -> Self {
        Self { store, adapters }
    }

    /// Registers an immutable template. Name collisions, malformed mappings,
    /// and action kinds without a registered adapter are all rejected here,
    /// so a stored template is always executable.
    pub fn execute(
        &self,
        name: String,
        trigger_kinds: Vec<TriggerKind>,
        action_kinds: Vec<ActionKind>,
        param_mapping: Vec<Vec<ParamSource>>,
    ) -> Result<StrategyTemplate, DomainError> {
        if self.store.find_by_name(&name)?.is_some() {
            return Err(DomainError::DuplicateTemplate(name));
        }
        for kind in &action_kinds {
            if !self.adapters.supports(*kind) {
                return Err(DomainError::NotFound(format!(
                    "No adapter registered for action kind {kind}"
                )));
            }
        }
        let template = StrategyTemplate::new(name, trigger_kinds, action_kinds, param_mapping)?;
        self.store.insert(&template)?;
        Ok(template)
    }

    pub fn get(&self, id: &str) -> Result<StrategyTemplate, DomainError> {
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::UnknownTemplate(id.to_string()))
    }

    pub fn list(&self) -> Result<Vec<StrategyTemplate>, DomainError> {
        self.store.list()
    }
}
