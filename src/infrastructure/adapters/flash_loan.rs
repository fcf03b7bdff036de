//! Flash-loan adapters. The pool tracks outstanding principal and the market
//! refuses to commit a recipe while any remains, so a borrow without a
//! matching in-recipe repay can never land.

use crate::domain::ports::protocol_adapter::{AdapterCall, AdapterError, ProtocolAdapter};
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::value::Value;
use crate::infrastructure::adapters::{token_arg, uint_arg};
use crate::infrastructure::sqlite::market::SqliteMarket;
use std::sync::Arc;

pub struct FlashBorrowAdapter {
    market: Arc<SqliteMarket>,
}

impl FlashBorrowAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for FlashBorrowAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::FlashBorrow
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let token = token_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        let borrowed = self.market.flash_borrow(call.owner, token, amount)?;
        Ok(vec![Value::Uint(borrowed)])
    }
}

pub struct FlashRepayAdapter {
    market: Arc<SqliteMarket>,
}

impl FlashRepayAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for FlashRepayAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::FlashRepay
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let token = token_arg(call.args, 0)?;
        let amount = uint_arg(call.args, 1)?;
        self.market.flash_repay(call.owner, token, amount)?;
        Ok(vec![])
    }
}
