use crate::domain::entities::subscription::Subscription;
use crate::domain::error::DomainError;
use crate::domain::ports::subscription_store::SubscriptionStore;
use crate::domain::values::address::Address;
use crate::infrastructure::sqlite::template_store::{json_column_error, to_json};
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteSubscriptionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSubscriptionStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn row_to_subscription(row: &rusqlite::Row) -> Result<Subscription, rusqlite::Error> {
        let owner: String = row.get(1)?;
        let combine: String = row.get(3)?;
        let action_consts: String = row.get(4)?;
        let triggers: String = row.get(5)?;
        let active: i64 = row.get(6)?;
        let created_str: String = row.get(7)?;

        Ok(Subscription {
            id: row.get(0)?,
            owner: Address::new(owner),
            template_id: row.get(2)?,
            combine: combine
                .parse()
                .map_err(|_| rusqlite::Error::InvalidParameterName(combine.clone()))?,
            action_consts: serde_json::from_str(&action_consts)
                .map_err(|e| json_column_error(4, e))?,
            triggers: serde_json::from_str(&triggers).map_err(|e| json_column_error(5, e))?,
            active: active != 0,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl SubscriptionStore for SqliteSubscriptionStore {
    fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO subscriptions (id, owner, template_id, combine, action_consts, triggers, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                subscription.id,
                subscription.owner.as_str(),
                subscription.template_id,
                subscription.combine.to_string(),
                to_json(&subscription.action_consts)?,
                to_json(&subscription.triggers)?,
                subscription.active as i64,
                subscription.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Storage(format!("Failed to insert subscription: {e}")))?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Subscription>, DomainError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, owner, template_id, combine, action_consts, triggers, active, created_at
             FROM subscriptions WHERE id = ?1",
            params![id],
            Self::row_to_subscription,
        )
        .optional()
        .map_err(|e| DomainError::Storage(e.to_string()))
    }

    fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let rows = conn
            .execute(
                "UPDATE subscriptions SET action_consts = ?1, triggers = ?2, active = ?3 WHERE id = ?4",
                params![
                    to_json(&subscription.action_consts)?,
                    to_json(&subscription.triggers)?,
                    subscription.active as i64,
                    subscription.id,
                ],
            )
            .map_err(|e| DomainError::Storage(format!("Failed to update subscription: {e}")))?;
        if rows == 0 {
            return Err(DomainError::UnknownSubscription(subscription.id.clone()));
        }
        Ok(())
    }

    fn list(&self, owner: Option<&Address>) -> Result<Vec<Subscription>, DomainError> {
        let conn = self.conn()?;
        let mut sql = String::from(
            "SELECT id, owner, template_id, combine, action_consts, triggers, active, created_at
             FROM subscriptions",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if let Some(owner) = owner {
            sql.push_str(" WHERE owner = ?1");
            param_values.push(Box::new(owner.as_str().to_string()));
        }
        sql.push_str(" ORDER BY created_at");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let subscriptions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_subscription)
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(subscriptions)
    }
}
