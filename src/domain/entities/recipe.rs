//! A recipe is an ordered, composable sequence of actions executed as one
//! atomic unit. It is a pure descriptor: execution happens in the recipe
//! engine, against a specific owner account.

use crate::domain::entities::action::{Action, ActionArg};
use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Recipe {
    /// Builds a recipe, rejecting malformed output references up front so a
    /// bad recipe is never submitted for execution.
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Result<Self, DomainError> {
        let recipe = Self {
            name: name.into(),
            actions,
        };
        recipe.validate()?;
        Ok(recipe)
    }

    /// Checks argument arities and that every `OutputRef` points at a slot
    /// produced by a strictly earlier action. Output slots are 1-based and
    /// assigned monotonically in execution order, so forward and cyclic
    /// references are impossible by construction.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut produced = 0usize;
        for (i, action) in self.actions.iter().enumerate() {
            if action.args.len() != action.kind.input_arity() {
                return Err(DomainError::ArityMismatch(format!(
                    "action {} ({}) takes {} arguments, got {}",
                    i + 1,
                    action.kind,
                    action.kind.input_arity(),
                    action.args.len()
                )));
            }
            for arg in &action.args {
                if let ActionArg::OutputRef(slot) = arg {
                    if *slot == 0 || *slot > produced {
                        return Err(DomainError::UnresolvedReference {
                            action: i + 1,
                            slot: *slot,
                        });
                    }
                }
            }
            produced += action.kind.output_arity();
        }
        Ok(())
    }
}
