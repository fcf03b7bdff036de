use crate::domain::error::DomainError;
use crate::domain::values::address::Address;

/// Allowlist of automation agents permitted to drive strategy execution.
///
/// Only allowlisted agents call the executor; the owner's proxy remains the
/// sole entity whose state changes, so automation runs without custody.
pub trait AgentRegistry: Send + Sync {
    fn is_authorized(&self, agent: &Address) -> Result<bool, DomainError>;

    fn authorize(&self, agent: &Address) -> Result<(), DomainError>;

    fn revoke(&self, agent: &Address) -> Result<(), DomainError>;
}
