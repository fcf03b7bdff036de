use crate::domain::values::address::Address;
use serde::{Deserialize, Serialize};

/// A leveraged lending position: collateral locked against outstanding debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub owner: Address,
    pub collateral_token: String,
    pub collateral_amount: u128,
    pub debt_token: String,
    pub debt_amount: u128,
}
