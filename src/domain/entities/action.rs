use crate::domain::error::DomainError;
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::value::Value;
use serde::{Deserialize, Serialize};

/// One argument slot of an action: either a literal value or a reference to
/// an output slot produced by an earlier action in the same recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "arg", content = "value", rename_all = "snake_case")]
pub enum ActionArg {
    Literal(Value),
    /// 1-based index into the enclosing recipe's output buffer.
    OutputRef(usize),
}

/// A single declarative operation against one protocol adapter.
///
/// Actions are immutable once constructed and carry no execution state;
/// reference resolution is the recipe engine's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub args: Vec<ActionArg>,
}

impl Action {
    pub fn new(kind: ActionKind, args: Vec<ActionArg>) -> Result<Self, DomainError> {
        if args.len() != kind.input_arity() {
            return Err(DomainError::ArityMismatch(format!(
                "action kind {kind} takes {} arguments, got {}",
                kind.input_arity(),
                args.len()
            )));
        }
        Ok(Self { kind, args })
    }
}
