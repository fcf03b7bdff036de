//! Bundle runner — the explicit "first success wins" fallback policy over an
//! ordered list of alternative subscriptions.

use crate::application::execute_strategy::StrategyExecutor;
use crate::domain::entities::bundle::Bundle;
use crate::domain::error::DomainError;
use crate::domain::ports::bundle_store::BundleStore;
use crate::domain::ports::subscription_store::SubscriptionStore;
use crate::domain::values::address::Address;
use crate::domain::values::trigger::TriggerPayload;
use crate::domain::values::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Runtime inputs for one bundle entry, aligned by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub trigger_payloads: Vec<TriggerPayload>,
    pub action_args: Vec<Vec<Value>>,
}

/// Which entry succeeded and what its recipe produced.
#[derive(Debug, Clone, Serialize)]
pub struct BundleOutcome {
    pub index: usize,
    pub subscription_id: String,
    pub outputs: Vec<Value>,
}

pub struct BundleUseCase {
    bundles: Arc<dyn BundleStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    executor: Arc<StrategyExecutor>,
}

impl BundleUseCase {
    pub fn new(
        bundles: Arc<dyn BundleStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        executor: Arc<StrategyExecutor>,
    ) -> Self {
        Self {
            bundles,
            subscriptions,
            executor,
        }
    }

    pub fn create(&self, entries: Vec<String>) -> Result<Bundle, DomainError> {
        for id in &entries {
            if self.subscriptions.get(id)?.is_none() {
                return Err(DomainError::UnknownSubscription(id.clone()));
            }
        }
        let bundle = Bundle::new(entries)?;
        self.bundles.insert(&bundle)?;
        Ok(bundle)
    }

    pub fn get(&self, id: &str) -> Result<Bundle, DomainError> {
        self.bundles
            .get(id)?
            .ok_or_else(|| DomainError::UnknownBundle(id.to_string()))
    }

    pub fn list(&self) -> Result<Vec<Bundle>, DomainError> {
        self.bundles.list()
    }

    /// Attempts entries in declared order and stops at the first success.
    /// A failed entry leaves no effects (recipe atomicity), so falling
    /// through to the next alternative is always safe. When every entry
    /// fails, the last failure propagates; there is no internal retry.
    pub async fn run(
        &self,
        caller: &Address,
        bundle_id: &str,
        attempts: &[StrategyAttempt],
    ) -> Result<BundleOutcome, DomainError> {
        let bundle = self.get(bundle_id)?;
        if attempts.len() != bundle.entries.len() {
            return Err(DomainError::ArityMismatch(format!(
                "bundle has {} entries, got {} attempts",
                bundle.entries.len(),
                attempts.len()
            )));
        }

        let mut last_err = None;
        for (index, (subscription_id, attempt)) in
            bundle.entries.iter().zip(attempts).enumerate()
        {
            match self
                .executor
                .execute(
                    caller,
                    subscription_id,
                    &attempt.trigger_payloads,
                    &attempt.action_args,
                )
                .await
            {
                Ok(outputs) => {
                    return Ok(BundleOutcome {
                        index,
                        subscription_id: subscription_id.clone(),
                        outputs,
                    })
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or(DomainError::EmptyBundle))
    }
}
