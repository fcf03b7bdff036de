use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered group of alternative subscriptions sharing one intent.
///
/// Ordering encodes fallback preference; entry 0 is tried first. The bundle
/// itself is a pure descriptor — fallback iteration lives in the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub entries: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Bundle {
    pub fn new(entries: Vec<String>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::EmptyBundle);
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            entries,
            created_at: Utc::now(),
        })
    }
}
