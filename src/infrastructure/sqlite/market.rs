//! Simulated on-chain market: token balances, lending positions, stored USD
//! quotes, and a flash-loan pool, all in one sqlite ledger.
//!
//! Atomicity comes from SQL savepoints on the shared connection: the recipe
//! engine brackets each run with snapshot/commit/revert, so a failing action
//! leaves nothing behind. The flash pool refuses a commit while principal is
//! outstanding, which is what forces flash recipes to repay in-unit.

use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;
use crate::domain::ports::chain_state::{ChainState, SnapshotId};
use crate::domain::ports::live_state::{LiveStateReader, RatioSnapshot};
use crate::domain::ports::price_oracle::PriceOracle;
use crate::domain::ports::protocol_adapter::AdapterError;
use crate::domain::values::address::Address;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteMarket {
    conn: Arc<Mutex<Connection>>,
    oracle: Arc<dyn PriceOracle>,
    snapshot_seq: AtomicU64,
}

impl SqliteMarket {
    pub fn new(conn: Arc<Mutex<Connection>>, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            conn,
            oracle,
            snapshot_seq: AtomicU64::new(0),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn row_to_position(row: &rusqlite::Row) -> Result<Position, rusqlite::Error> {
        let id: i64 = row.get(0)?;
        let owner: String = row.get(1)?;
        Ok(Position {
            id: id as u64,
            owner: Address::new(owner),
            collateral_token: row.get(2)?,
            collateral_amount: parse_amount_sql(row, 3)?,
            debt_token: row.get(4)?,
            debt_amount: parse_amount_sql(row, 5)?,
        })
    }

    // ── account and position management ──────────────────────────────────

    pub fn open_position(
        &self,
        owner: &Address,
        collateral_token: &str,
        collateral_amount: u128,
        debt_token: &str,
        debt_amount: u128,
    ) -> Result<Position, DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO positions (owner, collateral_token, collateral_amount, debt_token, debt_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                owner.as_str(),
                collateral_token,
                collateral_amount.to_string(),
                debt_token,
                debt_amount.to_string(),
            ],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to open position: {e}")))?;
        let id = conn.last_insert_rowid() as u64;
        Ok(Position {
            id,
            owner: owner.clone(),
            collateral_token: collateral_token.to_string(),
            collateral_amount,
            debt_token: debt_token.to_string(),
            debt_amount,
        })
    }

    pub fn position(&self, id: u64) -> Result<Position, DomainError> {
        let conn = self.conn()?;
        Self::query_position(&conn, id)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Position not found: {id}")))
    }

    pub fn positions(&self) -> Result<Vec<Position>, DomainError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, owner, collateral_token, collateral_amount, debt_token, debt_amount
                 FROM positions ORDER BY id",
            )
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let positions = stmt
            .query_map([], Self::row_to_position)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(positions)
    }

    pub fn set_balance(
        &self,
        account: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), DomainError> {
        let conn = self.conn()?;
        Self::write_balance(&conn, account, token, amount)
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    pub fn balance(&self, account: &Address, token: &str) -> Result<u128, DomainError> {
        let conn = self.conn()?;
        Self::read_balance(&conn, account, token).map_err(|e| DomainError::Storage(e.to_string()))
    }

    /// Stores a USD quote. Quotes must be finite and strictly positive;
    /// anything else would corrupt every cross rate derived from them.
    pub fn set_price(&self, token: &str, usd: f64) -> Result<(), DomainError> {
        if !usd.is_finite() || usd <= 0.0 {
            return Err(DomainError::Parse(format!(
                "price for {token} must be a finite positive number, got {usd}"
            )));
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO prices (token, usd) VALUES (?1, ?2)
             ON CONFLICT(token) DO UPDATE SET usd = excluded.usd",
            params![token, usd],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to set price: {e}")))?;
        Ok(())
    }

    pub fn spot_price(&self, token: &str) -> Result<f64, DomainError> {
        let conn = self.conn()?;
        Self::read_price(&conn, token)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("No stored price for token: {token}")))
    }

    /// Pulls fresh quotes from the configured oracle into the stored price
    /// table. Fetches happen outside the ledger lock.
    pub async fn sync_prices(&self, tokens: &[String]) -> Result<(), DomainError> {
        let mut quotes = Vec::with_capacity(tokens.len());
        for token in tokens {
            let usd = self.oracle.usd_price(token).await?;
            quotes.push((token.clone(), usd));
        }
        for (token, usd) in quotes {
            self.set_price(&token, usd)?;
        }
        Ok(())
    }

    // ── adapter-facing mutations ──────────────────────────────────────────

    pub fn supply(
        &self,
        owner: &Address,
        position_id: u64,
        amount: u128,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let mut position = Self::owned_position(&conn, owner, position_id)?;
        Self::debit(&conn, owner, &position.collateral_token.clone(), amount)?;
        position.collateral_amount += amount;
        Self::save_position(&conn, &position)?;
        Ok(amount)
    }

    pub fn withdraw(
        &self,
        owner: &Address,
        position_id: u64,
        amount: u128,
        to: &Address,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let mut position = Self::owned_position(&conn, owner, position_id)?;
        if position.collateral_amount < amount {
            return Err(AdapterError::new(format!(
                "insufficient collateral: position {position_id} holds {}, requested {amount}",
                position.collateral_amount
            )));
        }
        position.collateral_amount -= amount;
        Self::save_position(&conn, &position)?;
        Self::credit(&conn, to, &position.collateral_token, amount)?;
        Ok(amount)
    }

    pub fn borrow(
        &self,
        owner: &Address,
        position_id: u64,
        amount: u128,
        to: &Address,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let mut position = Self::owned_position(&conn, owner, position_id)?;
        position.debt_amount += amount;
        Self::save_position(&conn, &position)?;
        Self::credit(&conn, to, &position.debt_token, amount)?;
        Ok(amount)
    }

    /// Repays up to the outstanding debt; returns the amount actually applied.
    pub fn repay(
        &self,
        owner: &Address,
        position_id: u64,
        amount: u128,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let mut position = Self::owned_position(&conn, owner, position_id)?;
        let repaid = amount.min(position.debt_amount);
        Self::debit(&conn, owner, &position.debt_token.clone(), repaid)?;
        position.debt_amount -= repaid;
        Self::save_position(&conn, &position)?;
        Ok(repaid)
    }

    /// Swaps at the stored cross rate; the venue has unbounded liquidity.
    /// Proceeds go through f64, so amounts above 2^53 round.
    pub fn sell(
        &self,
        owner: &Address,
        sell_token: &str,
        buy_token: &str,
        amount: u128,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let sell_price = Self::require_price(&conn, sell_token)?;
        let buy_price = Self::require_price(&conn, buy_token)?;
        Self::debit(&conn, owner, sell_token, amount)?;
        let bought = (amount as f64 * sell_price / buy_price) as u128;
        Self::credit(&conn, owner, buy_token, bought)?;
        Ok(bought)
    }

    pub fn flash_borrow(
        &self,
        owner: &Address,
        token: &str,
        amount: u128,
    ) -> Result<u128, AdapterError> {
        let conn = self.adapter_conn()?;
        let outstanding = Self::read_outstanding(&conn, token)?;
        Self::write_outstanding(&conn, token, outstanding + amount)?;
        Self::credit(&conn, owner, token, amount)?;
        Ok(amount)
    }

    pub fn flash_repay(
        &self,
        owner: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), AdapterError> {
        let conn = self.adapter_conn()?;
        let outstanding = Self::read_outstanding(&conn, token)?;
        if amount > outstanding {
            return Err(AdapterError::new(format!(
                "flash repay of {amount} {token} exceeds outstanding principal {outstanding}"
            )));
        }
        Self::debit(&conn, owner, token, amount)?;
        Self::write_outstanding(&conn, token, outstanding - amount)?;
        Ok(())
    }

    pub fn outstanding_flash(&self, token: &str) -> Result<u128, DomainError> {
        let conn = self.conn()?;
        Self::read_outstanding(&conn, token).map_err(|e| DomainError::Storage(e.reason))
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn adapter_conn(&self) -> Result<MutexGuard<'_, Connection>, AdapterError> {
        self.conn.lock().map_err(|e| AdapterError::new(e.to_string()))
    }

    fn query_position(conn: &Connection, id: u64) -> Result<Option<Position>, rusqlite::Error> {
        conn.query_row(
            "SELECT id, owner, collateral_token, collateral_amount, debt_token, debt_amount
             FROM positions WHERE id = ?1",
            params![id as i64],
            Self::row_to_position,
        )
        .optional()
    }

    fn owned_position(
        conn: &Connection,
        owner: &Address,
        id: u64,
    ) -> Result<Position, AdapterError> {
        let position = Self::query_position(conn, id)
            .map_err(|e| AdapterError::new(e.to_string()))?
            .ok_or_else(|| AdapterError::new(format!("unknown position: {id}")))?;
        if position.owner != *owner {
            return Err(AdapterError::new(format!(
                "position {id} is not owned by {owner}"
            )));
        }
        Ok(position)
    }

    fn save_position(conn: &Connection, position: &Position) -> Result<(), AdapterError> {
        conn.execute(
            "UPDATE positions SET collateral_amount = ?1, debt_amount = ?2 WHERE id = ?3",
            params![
                position.collateral_amount.to_string(),
                position.debt_amount.to_string(),
                position.id as i64,
            ],
        )
        .map_err(|e| AdapterError::new(e.to_string()))?;
        Ok(())
    }

    fn read_balance(
        conn: &Connection,
        account: &Address,
        token: &str,
    ) -> Result<u128, rusqlite::Error> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT amount FROM balances WHERE account = ?1 AND token = ?2",
                params![account.as_str(), token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stored.and_then(|s| s.parse().ok()).unwrap_or(0))
    }

    fn write_balance(
        conn: &Connection,
        account: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO balances (account, token, amount) VALUES (?1, ?2, ?3)
             ON CONFLICT(account, token) DO UPDATE SET amount = excluded.amount",
            params![account.as_str(), token, amount.to_string()],
        )?;
        Ok(())
    }

    fn credit(
        conn: &Connection,
        account: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), AdapterError> {
        let current =
            Self::read_balance(conn, account, token).map_err(|e| AdapterError::new(e.to_string()))?;
        Self::write_balance(conn, account, token, current + amount)
            .map_err(|e| AdapterError::new(e.to_string()))
    }

    fn debit(
        conn: &Connection,
        account: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), AdapterError> {
        let current =
            Self::read_balance(conn, account, token).map_err(|e| AdapterError::new(e.to_string()))?;
        if current < amount {
            return Err(AdapterError::new(format!(
                "insufficient {token} balance for {account}: have {current}, need {amount}"
            )));
        }
        Self::write_balance(conn, account, token, current - amount)
            .map_err(|e| AdapterError::new(e.to_string()))
    }

    fn read_price(conn: &Connection, token: &str) -> Result<Option<f64>, rusqlite::Error> {
        conn.query_row(
            "SELECT usd FROM prices WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )
        .optional()
    }

    fn require_price(conn: &Connection, token: &str) -> Result<f64, AdapterError> {
        let usd = Self::read_price(conn, token)
            .map_err(|e| AdapterError::new(e.to_string()))?
            .ok_or_else(|| AdapterError::new(format!("no stored price for token: {token}")))?;
        if !usd.is_finite() || usd <= 0.0 {
            return Err(AdapterError::new(format!(
                "stored price for {token} is unusable: {usd}"
            )));
        }
        Ok(usd)
    }

    fn read_outstanding(conn: &Connection, token: &str) -> Result<u128, AdapterError> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT amount FROM flash_loans WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AdapterError::new(e.to_string()))?;
        Ok(stored.and_then(|s| s.parse().ok()).unwrap_or(0))
    }

    fn write_outstanding(
        conn: &Connection,
        token: &str,
        amount: u128,
    ) -> Result<(), AdapterError> {
        if amount == 0 {
            conn.execute("DELETE FROM flash_loans WHERE token = ?1", params![token])
                .map_err(|e| AdapterError::new(e.to_string()))?;
        } else {
            conn.execute(
                "INSERT INTO flash_loans (token, amount) VALUES (?1, ?2)
                 ON CONFLICT(token) DO UPDATE SET amount = excluded.amount",
                params![token, amount.to_string()],
            )
            .map_err(|e| AdapterError::new(e.to_string()))?;
        }
        Ok(())
    }

    fn any_outstanding(conn: &Connection) -> Result<bool, rusqlite::Error> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM flash_loans", [], |row| row.get(0))?;
        Ok(count > 0)
    }
}

impl ChainState for SqliteMarket {
    fn snapshot(&self) -> Result<SnapshotId, DomainError> {
        let id = self.snapshot_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let conn = self.conn()?;
        conn.execute_batch(&format!("SAVEPOINT sp_{id}"))
            .map_err(|e| DomainError::Storage(format!("Failed to open savepoint: {e}")))?;
        Ok(id)
    }

    fn commit(&self, snapshot: SnapshotId) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let outstanding =
            Self::any_outstanding(&conn).map_err(|e| DomainError::Storage(e.to_string()))?;
        if outstanding {
            conn.execute_batch(&format!(
                "ROLLBACK TO sp_{snapshot}; RELEASE sp_{snapshot}"
            ))
            .map_err(|e| DomainError::Storage(format!("Failed to revert savepoint: {e}")))?;
            return Err(DomainError::Adapter {
                step: "commit".to_string(),
                reason: "flash loan principal still outstanding".to_string(),
            });
        }
        conn.execute_batch(&format!("RELEASE sp_{snapshot}"))
            .map_err(|e| DomainError::Storage(format!("Failed to release savepoint: {e}")))?;
        Ok(())
    }

    fn revert(&self, snapshot: SnapshotId) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "ROLLBACK TO sp_{snapshot}; RELEASE sp_{snapshot}"
        ))
        .map_err(|e| DomainError::Storage(format!("Failed to revert savepoint: {e}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LiveStateReader for SqliteMarket {
    async fn read_ratio(&self, position: u64) -> Result<RatioSnapshot, DomainError> {
        let position = self.position(position)?;
        let collateral_price = self.spot_price(&position.collateral_token)?;
        let debt_price = self.spot_price(&position.debt_token)?;
        Ok(RatioSnapshot {
            collateral_value: position.collateral_amount as f64 * collateral_price,
            debt_value: position.debt_amount as f64 * debt_price,
        })
    }

    async fn read_position(&self, position: u64) -> Result<Position, DomainError> {
        self.position(position)
    }
}

fn parse_amount_sql(row: &rusqlite::Row, idx: usize) -> Result<u128, rusqlite::Error> {
    let stored: String = row.get(idx)?;
    stored.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid amount: {stored}").into(),
        )
    })
}
