use crate::domain::ports::protocol_adapter::{AdapterCall, AdapterError, ProtocolAdapter};
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::value::Value;
use crate::infrastructure::adapters::{token_arg, uint_arg};
use crate::infrastructure::sqlite::market::SqliteMarket;
use std::sync::Arc;

/// Swaps at the market's stored cross rate. The proceeds it outputs are the
/// executed amount, which is what downstream repay steps pipe from.
pub struct SellAdapter {
    market: Arc<SqliteMarket>,
}

impl SellAdapter {
    pub fn new(market: Arc<SqliteMarket>) -> Self {
        Self { market }
    }
}

impl ProtocolAdapter for SellAdapter {
    fn kind(&self) -> ActionKind {
        ActionKind::Sell
    }

    fn invoke(&self, call: AdapterCall<'_>) -> Result<Vec<Value>, AdapterError> {
        let sell_token = token_arg(call.args, 0)?;
        let buy_token = token_arg(call.args, 1)?;
        let amount = uint_arg(call.args, 2)?;
        let bought = self
            .market
            .sell(call.owner, sell_token, buy_token, amount)?;
        Ok(vec![Value::Uint(bought)])
    }
}
