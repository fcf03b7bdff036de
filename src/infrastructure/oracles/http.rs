use crate::domain::error::DomainError;
use crate::domain::ports::price_oracle::PriceOracle;
use reqwest::Client;
use serde::Deserialize;

/// Fetches USD quotes from a JSON price endpoint.
///
/// Expects `GET {base_url}/{token}` to return `{"token": "...", "usd": 123.4}`.
pub struct HttpPriceOracle {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct QuoteResponse {
    usd: f64,
}

impl HttpPriceOracle {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn usd_price(&self, token: &str) -> Result<f64, DomainError> {
        let url = format!("{}/{token}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Storage(format!("Price feed error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Storage(format!("Price feed {status}: {body}")));
        }

        let quote: QuoteResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("Price feed parse error: {e}")))?;
        Ok(quote.usd)
    }
}
