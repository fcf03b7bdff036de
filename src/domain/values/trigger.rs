use crate::domain::values::ratio_state::RatioState;
use crate::domain::values::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of trigger families a template can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Ratio,
    Time,
}

impl TriggerKind {
    /// Number of runtime payload values this kind expects at evaluation time.
    pub fn payload_arity(&self) -> usize {
        match self {
            TriggerKind::Ratio => 0,
            TriggerKind::Time => 1,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Ratio => write!(f, "ratio"),
            TriggerKind::Time => write!(f, "time"),
        }
    }
}

impl FromStr for TriggerKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ratio" => Ok(TriggerKind::Ratio),
            "time" => Ok(TriggerKind::Time),
            _ => Err(format!("Unknown trigger kind: {s}")),
        }
    }
}

/// Static trigger parameters fixed when the owner subscribes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TriggerConfig {
    /// Fires when the position's collateralization ratio is under/over the threshold.
    Ratio {
        position: u64,
        threshold: f64,
        state: RatioState,
    },
    /// Fires once the agent-observed time passes `after`.
    Time { after: DateTime<Utc> },
}

impl TriggerConfig {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerConfig::Ratio { .. } => TriggerKind::Ratio,
            TriggerConfig::Time { .. } => TriggerKind::Time,
        }
    }
}

/// Runtime data supplied by the automation agent at evaluation time.
///
/// The value count must match the trigger kind's declared payload arity:
/// ratio triggers carry no runtime data, time triggers carry the agent's
/// observed unix timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerPayload {
    pub values: Vec<Value>,
}

impl TriggerPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn observed_at(at: DateTime<Utc>) -> Self {
        Self {
            values: vec![Value::Uint(at.timestamp().max(0) as u128)],
        }
    }
}
