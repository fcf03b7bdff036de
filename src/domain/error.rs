use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),

    #[error("Unresolved reference: action {action} references output slot {slot}")]
    UnresolvedReference { action: usize, slot: usize },

    #[error("Duplicate template: {0}")]
    DuplicateTemplate(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),

    #[error("Subscription is deactivated: {0}")]
    InactiveSubscription(String),

    #[error("Caller is not authorized: {0}")]
    UnauthorizedCaller(String),

    #[error("Trigger not satisfied")]
    TriggerNotSatisfied,

    #[error("Adapter failure at {step}: {reason}")]
    Adapter { step: String, reason: String },

    #[error("Bundle must contain at least one strategy")]
    EmptyBundle,

    #[error("Unknown bundle: {0}")]
    UnknownBundle(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// True for outcomes that are expected during routine polling and safe
    /// to retry on a later cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::TriggerNotSatisfied)
    }
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Storage(s)
    }
}
