use crate::domain::entities::subscription::Subscription;
use crate::domain::error::DomainError;
use crate::domain::values::address::Address;

pub trait SubscriptionStore: Send + Sync {
    fn insert(&self, subscription: &Subscription) -> Result<(), DomainError>;

    fn get(&self, id: &str) -> Result<Option<Subscription>, DomainError>;

    /// Persists updated parameters or the terminal inactive flag.
    fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    fn list(&self, owner: Option<&Address>) -> Result<Vec<Subscription>, DomainError>;
}
