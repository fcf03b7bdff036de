//! Protocol adapter port: the seam between the recipe engine and external
//! protocols (lending market, swap venue, flash-loan source).
//!
//! Each adapter performs exactly one external effect per invocation and
//! returns the values it appends to the recipe output buffer. Adapters never
//! resolve output references; they receive fully resolved arguments.

use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::address::Address;
use crate::domain::values::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure of an external effect. Aborts the enclosing recipe; the engine
/// attaches which step failed.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct AdapterError {
    pub reason: String,
}

impl AdapterError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// One resolved invocation, executed under the owner's proxy authority.
pub struct AdapterCall<'a> {
    pub owner: &'a Address,
    pub args: &'a [Value],
}

pub trait ProtocolAdapter: Send + Sync {
    /// The single action kind this adapter handles.
    fn kind(&self) -> ActionKind;

    /// Performs the external effect and returns the output values, in order.
    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError>;
}

/// Maps action kinds to concrete handlers. Coverage is checked when a
/// template is registered, not when a recipe runs.
pub struct AdapterRegistry {
    handlers: HashMap<ActionKind, Arc<dyn ProtocolAdapter>>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Arc<dyn ProtocolAdapter>>) -> Self {
        let handlers = adapters.into_iter().map(|a| (a.kind(), a)).collect();
        Self { handlers }
    }

    pub fn supports(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn get(&self, kind: ActionKind) -> Option<&Arc<dyn ProtocolAdapter>> {
        self.handlers.get(&kind)
    }
}
