use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a subscription combines its triggers. Fixed at subscription time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Every trigger must hold on the same evaluation call.
    All,
    /// At least one trigger must hold.
    Any,
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineMode::All => write!(f, "all"),
            CombineMode::Any => write!(f, "any"),
        }
    }
}

impl FromStr for CombineMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(CombineMode::All),
            "any" => Ok(CombineMode::Any),
            _ => Err(format!("Unknown combine mode: {s}")),
        }
    }
}
