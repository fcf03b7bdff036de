use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;
use serde::Serialize;

/// Fresh valuation of one position, read immediately before the gate check.
/// Values are f64, so amounts above 2^53 units are valued approximately.
#[derive(Debug, Clone, Serialize)]
pub struct RatioSnapshot {
    pub collateral_value: f64,
    pub debt_value: f64,
}

impl RatioSnapshot {
    /// Collateralization ratio. Infinite when the position carries no debt.
    pub fn ratio(&self) -> f64 {
        if self.debt_value == 0.0 {
            f64::INFINITY
        } else {
            self.collateral_value / self.debt_value
        }
    }
}

/// Read-only view of live on-chain state, consumed by trigger evaluation.
/// Reads are never cached across the gate check and the execution step.
#[async_trait::async_trait]
pub trait LiveStateReader: Send + Sync {
    async fn read_ratio(&self, position: u64) -> Result<RatioSnapshot, DomainError>;

    async fn read_position(&self, position: u64) -> Result<Position, DomainError>;
}
