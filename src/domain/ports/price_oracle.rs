use crate::domain::error::DomainError;

/// External USD price source used to feed the market's stored quotes.
#[async_trait::async_trait]
pub trait PriceOracle: Send + Sync {
    async fn usd_price(&self, token: &str) -> Result<f64, DomainError>;
}
