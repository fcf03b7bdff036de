use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::error::DomainError;

/// Registry of immutable strategy templates, keyed by id with unique names.
pub trait TemplateStore: Send + Sync {
    /// Fails with [`DomainError::DuplicateTemplate`] on a name collision.
    fn insert(&self, template: &StrategyTemplate) -> Result<(), DomainError>;

    fn get(&self, id: &str) -> Result<Option<StrategyTemplate>, DomainError>;

    fn find_by_name(&self, name: &str) -> Result<Option<StrategyTemplate>, DomainError>;

    fn list(&self) -> Result<Vec<StrategyTemplate>, DomainError>;
}
