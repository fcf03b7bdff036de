use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison mode for ratio triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioState {
    Under,
    Over,
}

impl fmt::Display for RatioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioState::Under => write!(f, "under"),
            RatioState::Over => write!(f, "over"),
        }
    }
}

impl FromStr for RatioState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "under" => Ok(RatioState::Under),
            "over" => Ok(RatioState::Over),
            _ => Err(format!("Unknown ratio state: {s}")),
        }
    }
}
