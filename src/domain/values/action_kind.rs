use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of operations a recipe action can perform.
///
/// Each kind declares its argument and result arity so recipes can be
/// bounds-checked at construction time, before anything touches the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Deposit collateral into a position. Args: [position, amount].
    Supply,
    /// Withdraw collateral from a position. Args: [position, amount, to].
    Withdraw,
    /// Borrow against a position. Args: [position, amount, to].
    Borrow,
    /// Repay position debt from the owner's balance. Args: [position, amount].
    Repay,
    /// Swap one token for another at the venue rate. Args: [sell_token, buy_token, amount].
    Sell,
    /// Take an uncollateralized loan, credited to the owner. Args: [token, amount].
    FlashBorrow,
    /// Return flash-loan principal from the owner's balance. Args: [token, amount].
    FlashRepay,
}

impl ActionKind {
    /// Number of argument slots this kind consumes.
    pub fn input_arity(&self) -> usize {
        match self {
            ActionKind::Supply => 2,
            ActionKind::Withdraw => 3,
            ActionKind::Borrow => 3,
            ActionKind::Repay => 2,
            ActionKind::Sell => 3,
            ActionKind::FlashBorrow => 2,
            ActionKind::FlashRepay => 2,
        }
    }

    /// Number of values this kind appends to the recipe output buffer.
    pub fn output_arity(&self) -> usize {
        match self {
            ActionKind::FlashRepay => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Supply => "supply",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Borrow => "borrow",
            ActionKind::Repay => "repay",
            ActionKind::Sell => "sell",
            ActionKind::FlashBorrow => "flash-borrow",
            ActionKind::FlashRepay => "flash-repay",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ActionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supply" => Ok(ActionKind::Supply),
            "withdraw" => Ok(ActionKind::Withdraw),
            "borrow" => Ok(ActionKind::Borrow),
            "repay" => Ok(ActionKind::Repay),
            "sell" => Ok(ActionKind::Sell),
            "flash-borrow" => Ok(ActionKind::FlashBorrow),
            "flash-repay" => Ok(ActionKind::FlashRepay),
            _ => Err(format!("Unknown action kind: {s}")),
        }
    }
}
