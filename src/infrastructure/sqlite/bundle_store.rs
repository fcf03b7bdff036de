use crate::domain::entities::bundle::Bundle;
use crate::domain::error::DomainError;
use crate::domain::ports::bundle_store::BundleStore;
use crate::infrastructure::sqlite::template_store::{json_column_error, to_json};
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteBundleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBundleStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn row_to_bundle(row: &rusqlite::Row) -> Result<Bundle, rusqlite::Error> {
        let entries: String = row.get(1)?;
        let created_str: String = row.get(2)?;
        Ok(Bundle {
            id: row.get(0)?,
            entries: serde_json::from_str(&entries).map_err(|e| json_column_error(1, e))?,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl BundleStore for SqliteBundleStore {
    fn insert(&self, bundle: &Bundle) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO bundles (id, entries, created_at) VALUES (?1, ?2, ?3)",
            params![
                bundle.id,
                to_json(&bundle.entries)?,
                bundle.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to insert bundle: {e}")))?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Bundle>, DomainError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, entries, created_at FROM bundles WHERE id = ?1",
            params![id],
            Self::row_to_bundle,
        )
        .optional()
        .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn list(&self) -> Result<Vec<Bundle>, DomainError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, entries, created_at FROM bundles ORDER BY created_at")
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let bundles = stmt
            .query_map([], Self::row_to_bundle)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(bundles)
    }
}
