use crate::domain::error::DomainError;
use crate::domain::ports::price_oracle::PriceOracle;
use std::collections::HashMap;

/// Oracle with preset quotes. Default provider for tests and local use,
/// where prices are set manually on the market instead.
#[derive(Default)]
pub struct FixedPriceOracle {
    quotes: HashMap<String, f64>,
}

impl FixedPriceOracle {
    pub fn new(quotes: Vec<(String, f64)>) -> Self {
        Self {
            quotes: quotes.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn usd_price(&self, token: &str) -> Result<f64, DomainError> {
        self.quotes
            .get(token)
            .copied()
            .ok_or_else(|| DomainError::NotFound(format!("No fixed quote for token: {token}")))
    }
}
