//! Protocol adapters backed by the simulated sqlite market. Each handles
//! exactly one action kind; `registry` wires the full set.

pub mod exchange;
pub mod flash_loan;
pub mod lending;

use crate::domain::ports::protocol_adapter::{AdapterError, AdapterRegistry, ProtocolAdapter};
use crate::domain::values::value::Value;
use crate::infrastructure::sqlite::market::SqliteMarket;
use std::sync::Arc;

pub fn registry(market: Arc<SqliteMarket>) -> AdapterRegistry {
    let adapters: Vec<Arc<dyn ProtocolAdapter>> = vec![
        Arc::new(lending::SupplyAdapter::new(market.clone())),
        Arc::new(lending::WithdrawAdapter::new(market.clone())),
        Arc::new(lending::BorrowAdapter::new(market.clone())),
        Arc::new(lending::RepayAdapter::new(market.clone())),
        Arc::new(exchange::SellAdapter::new(market.clone())),
        Arc::new(flash_loan::FlashBorrowAdapter::new(market.clone())),
        Arc::new(flash_loan::FlashRepayAdapter::new(market)),
    ];
    AdapterRegistry::new(adapters)
}

pub(crate) fn uint_arg(args: &[Value], idx: usize) -> Result<u128, AdapterError> {
    args.get(idx)
        .and_then(Value::as_uint)
        .ok_or_else(|| AdapterError::new(format!("argument {idx} must be a uint")))
}

pub(crate) fn position_arg(args: &[Value], idx: usize) -> Result<u64, AdapterError> {
    let raw = uint_arg(args, idx)?;
    u64::try_from(raw)
        .map_err(|_| AdapterError::new(format!("argument {idx} is not a valid position id: {raw}")))
}

pub(crate) fn address_arg<'a>(
    args: &'a [Value],
    idx: usize,
) -> Result<&'a crate::domain::values::address::Address, AdapterError> {
    args.get(idx)
        .and_then(Value::as_address)
        .ok_or_else(|| AdapterError::new(format!("argument {idx} must be an address")))
}

pub(crate) fn token_arg<'a>(args: &'a [Value], idx: usize) -> Result<&'a str, AdapterError> {
    args.get(idx)
        .and_then(Value::as_text)
        .ok_or_else(|| AdapterError::new(format!("argument {idx} must be a token symbol")))
}
