use crate::domain::error::DomainError;
use crate::domain::ports::agent_registry::AgentRegistry;
use crate::domain::values::address::Address;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// Allowlist of automation agents, persisted alongside the rest of the state.
pub struct SqliteAgentRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAgentRegistry {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }
}

impl AgentRegistry for SqliteAgentRegistry {
    fn is_authorized(&self, agent: &Address) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM agents WHERE address = ?1",
                params![agent.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(count > 0)
    }

    fn authorize(&self, agent: &Address) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO agents (address) VALUES (?1)",
            params![agent.as_str()],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to authorize agent: {e}")))?;
        Ok(())
    }

    fn revoke(&self, agent: &Address) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM agents WHERE address = ?1",
            params![agent.as_str()],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to revoke agent: {e}")))?;
        Ok(())
    }
}
