use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::error::DomainError;
use crate::domain::ports::template_store::TemplateStore;
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteTemplateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTemplateStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn row_to_template(row: &rusqlite::Row) -> Result<StrategyTemplate, rusqlite::Error> {
        let trigger_kinds: String = row.get(2)?;
        let action_kinds: String = row.get(3)?;
        let param_mapping: String = row.get(4)?;
        let created_str: String = row.get(5)?;

        Ok(StrategyTemplate {
            id: row.get(0)?,
            name: row.get(1)?,
            trigger_kinds: serde_json::from_str(&trigger_kinds)
                .map_err(|e| json_column_error(2, e))?,
            action_kinds: serde_json::from_str(&action_kinds)
                .map_err(|e| json_column_error(3, e))?,
            param_mapping: serde_json::from_str(&param_mapping)
                .map_err(|e| json_column_error(4, e))?,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl TemplateStore for SqliteTemplateStore {
    fn insert(&self, template: &StrategyTemplate) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO templates (id, name, trigger_kinds, action_kinds, param_mapping, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                template.id,
                template.name,
                to_json(&template.trigger_kinds)?,
                to_json(&template.action_kinds)?,
                to_json(&template.param_mapping)?,
                template.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DomainError::DuplicateTemplate(template.name.clone())
            }
            other => DomainError::Storage(format!("Failed to insert template: {other}")),
        })?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<StrategyTemplate>, DomainError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, trigger_kinds, action_kinds, param_mapping, created_at
             FROM templates WHERE id = ?1",
            params![id],
            Self::row_to_template,
        )
        .optional()
        .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn find_by_name(&self, name: &str) -> Result<Option<StrategyTemplate>, DomainError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, trigger_kinds, action_kinds, param_mapping, created_at
             FROM templates WHERE name = ?1",
            params![name],
            Self::row_to_template,
        )
        .optional()
        .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn list(&self) -> Result<Vec<StrategyTemplate>, DomainError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, trigger_kinds, action_kinds, param_mapping, created_at
                 FROM templates ORDER BY created_at",
            )
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let templates = stmt
            .query_map([], Self::row_to_template)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(templates)
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Storage(e.to_string()))
}

pub(crate) fn json_column_error(idx: usize, e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(e),
    )
}
