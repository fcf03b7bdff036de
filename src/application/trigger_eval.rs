//! Trigger evaluation — stateless predicates over freshly read chain state.

use crate::domain::error::DomainError;
use crate::domain::ports::live_state::LiveStateReader;
use crate::domain::values::combine_mode::CombineMode;
use crate::domain::values::ratio_state::RatioState;
use crate::domain::values::trigger::{TriggerConfig, TriggerPayload};
use chrono::DateTime;
use std::sync::Arc;

#[derive(Clone)]
pub struct TriggerEvaluator {
    reader: Arc<dyn LiveStateReader>,
}

impl TriggerEvaluator {
    pub fn new(reader: Arc<dyn LiveStateReader>) -> Self {
        Self { reader }
    }

    /// Evaluates one trigger. Pure with respect to the reader: identical
    /// state yields an identical boolean, and nothing is mutated.
    pub async fn evaluate(
        &self,
        config: &TriggerConfig,
        payload: &TriggerPayload,
    ) -> Result<bool, DomainError> {
        let expected = config.kind().payload_arity();
        if payload.values.len() != expected {
            return Err(DomainError::ArityMismatch(format!(
                "{} trigger expects {expected} payload values, got {}",
                config.kind(),
                payload.values.len()
            )));
        }

        match config {
            TriggerConfig::Ratio {
                position,
                threshold,
                state,
            } => {
                let snapshot = self.reader.read_ratio(*position).await?;
                let ratio = snapshot.ratio();
                Ok(match state {
                    RatioState::Under => ratio < *threshold,
                    RatioState::Over => ratio > *threshold,
                })
            }
            TriggerConfig::Time { after } => {
                let ts = payload.values[0].as_uint().ok_or_else(|| {
                    DomainError::ArityMismatch(
                        "time trigger payload must be a uint timestamp".to_string(),
                    )
                })?;
                let observed = DateTime::from_timestamp(ts.min(i64::MAX as u128) as i64, 0)
                    .ok_or_else(|| {
                        DomainError::Parse(format!("invalid unix timestamp: {ts}"))
                    })?;
                Ok(observed >= *after)
            }
        }
    }

    /// Evaluates every trigger of a subscription on the same call and
    /// combines the results per the subscription's mode.
    pub async fn evaluate_all(
        &self,
        configs: &[TriggerConfig],
        payloads: &[TriggerPayload],
        combine: CombineMode,
    ) -> Result<bool, DomainError> {
        if payloads.len() != configs.len() {
            return Err(DomainError::ArityMismatch(format!(
                "subscription has {} triggers, got {} payloads",
                configs.len(),
                payloads.len()
            )));
        }

        let mut any = false;
        let mut all = true;
        for (config, payload) in configs.iter().zip(payloads) {
            let satisfied = self.evaluate(config, payload).await?;
            any |= satisfied;
            all &= satisfied;
        }

        Ok(match combine {
            CombineMode::All => all,
            CombineMode::Any => any && !configs.is_empty(),
        })
    }
}
