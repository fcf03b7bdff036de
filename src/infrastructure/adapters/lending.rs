//! Lending-market adapters: supply, withdraw, borrow, repay. All four act
//! on a position owned by the caller; ownership is enforced by the market
//! itself.

use crate::domain::ports::protocol_adapter::{AdapterCall, AdapterError, ProtocolAdapter};
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::value::Value;
use crate::infrastructure::adapters::{address_arg, position_arg, uint_arg};
use crate::infrastructure::sqlite::market::SqliteMarket;
use std::sync::Arc;

pub struct SupplyAdapter {
    market: Arc<SqliteMarket>,
}

impl SupplyAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for SupplyAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::Supply
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let position = position_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        let supplied = self.market.supply(call.owner, position, amount)?;
        Ok(vec![Value::Uint(supplied)])
    }
}

pub struct WithdrawAdapter {
    market: Arc<SqliteMarket>,
}

impl WithdrawAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for WithdrawAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::Withdraw
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let position = position_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        let to = address_arg(call.args, 2)?;
        let withdrawn = self.market.withdraw(call.owner, position, amount, to)?;
        Ok(vec![Value::Uint(withdrawn)])
    }
}

pub struct BorrowAdapter {
    market: Arc<SqliteMarket>,
}

impl BorrowAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for BorrowAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::Borrow
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let position = position_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        let to = address_arg(call.args, 2)?;
        let borrowed = self.market.borrow(call.owner, position, amount, to)?;
        Ok(vec![Value::Uint(borrowed)])
    }
}

pub struct RepayAdapter {
    market: Arc<SqliteMarket>,
}

impl RepayAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for RepayAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::Repay
    }

    /// Outputs the amount actually applied to debt, which may be less than
    /// requested when the position is nearly paid off.
    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let position = position_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        let repaid = self.market.repay(call.owner, position, amount)?;
        Ok(vec![Value::Uint(repaid)])
    }
}
