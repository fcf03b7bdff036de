use crate::domain::entities::bundle::Bundle;
use crate::domain::error::DomainError;

pub trait BundleStore: Send + Sync {
    fn insert(&self, bundle: &Bundle) -> Result<(), DomainError>;

    fn get(&self, id: &str) -> Result<Option<Bundle>, DomainError>;

    fn list(&self) -> Result<Vec<Bundle>, DomainError>;
}
