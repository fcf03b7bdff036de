//! Recipe engine — runs an ordered action list as one atomic unit, resolving
//! inter-action output piping along the way.
//!
//! Piping via output-buffer references lets later actions consume amounts
//! computed by earlier ones ("sell this collateral, then repay with whatever
//! the sale returned") without an off-chain re-query between steps, so the
//! repaid amount is the executed amount, not an estimate.

use crate::domain::entities::action::ActionArg;
use crate::domain::entities::recipe::Recipe;
use crate::domain::error::DomainError;
use crate::domain::ports::chain_state::ChainState;
use crate::domain::ports::protocol_adapter::{AdapterCall, AdapterRegistry};
use crate::domain::values::address::Address;
use crate::domain::values::value::Value;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct RecipeEngine {
    adapters: Arc<AdapterRegistry>,
    chain: Arc<dyn ChainState>,
    /// Serializes runs: snapshot brackets on the ledger must not interleave.
    run_gate: Arc<Mutex<()>>,
}

impl RecipeEngine {
    pub fn new(adapters: Arc<AdapterRegistry>, chain: Arc<dyn ChainState>) -> Self {
        Self {
            adapters,
            chain,
            run_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Executes the recipe under the owner's authority.
    ///
    /// Either every action commits or the ledger is reverted to the snapshot
    /// taken before the first action; there is no partial commit and failed
    /// runs retain no outputs. On success returns the full output buffer.
    pub fn execute(&self, recipe: &Recipe, owner: &Address) -> Result<Vec<Value>, DomainError> {
        recipe.validate()?;
        let _run = self
            .run_gate
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let snapshot = self.chain.snapshot()?;
        match self.run(recipe, owner) {
            Ok(outputs) => {
                // The ledger may still refuse the commit (outstanding flash
                // principal); a refused commit reverts before erroring.
                self.chain.commit(snapshot)?;
                Ok(outputs)
            }
            Err(e) => {
                self.chain.revert(snapshot)?;
                Err(e)
            }
        }
    }

    fn run(&self, recipe: &Recipe, owner: &Address) -> Result<Vec<Value>, DomainError> {
        let mut outputs: Vec<Value> = Vec::new();
        for (i, action) in recipe.actions.iter().enumerate() {
            let mut resolved = Vec::with_capacity(action.args.len());
            for arg in &action.args {
                match arg {
                    ActionArg::Literal(v) => resolved.push(v.clone()),
                    ActionArg::OutputRef(slot) => {
                        let v = slot
                            .checked_sub(1)
                            .and_then(|idx| outputs.get(idx))
                            .ok_or(DomainError::UnresolvedReference {
                                action: i + 1,
                                slot: *slot,
                            })?;
                        resolved.push(v.clone());
                    }
                }
            }

            let adapter = self.adapters.get(action.kind).ok_or_else(|| {
                DomainError::NotFound(format!("No adapter registered for action kind {}", action.kind))
            })?;
            let mut produced = adapter
                .invoke(AdapterCall {
                    owner,
                    args: &resolved,
                })
                .map_err(|e| DomainError::Adapter {
                    step: format!("action {} ({})", i + 1, action.kind),
                    reason: e.reason,
                })?;
            outputs.append(&mut produced);
        }
        Ok(outputs)
    }
}
