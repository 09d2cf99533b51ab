use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::{error, warn};

use super::{StateStore, STATE_KEY};
use crate::models::AlertState;

const CREATE_TABLES_SQL: &str = include_str!("../../migrations/create_tables.sql");

/// State kept as a JSON string in the `bot_state` key-value table
pub struct MySqlStateStore {
    pool: MySqlPool,
}

impl MySqlStateStore {
    /// Connect and create the table if needed
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPool::connect(database_url).await?;
        sqlx::raw_sql(CREATE_TABLES_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    async fn fetch_state_value(&self) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT state_value FROM bot_state WHERE state_key = ?")
            .bind(STATE_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("state_value")))
    }

    async fn upsert_state_value(&self, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO bot_state (state_key, state_value) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE state_value = VALUES(state_value), date_updated = CURRENT_TIMESTAMP",
        )
        .bind(STATE_KEY)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for MySqlStateStore {
    async fn read(&self) -> AlertState {
        match self.fetch_state_value().await {
            Ok(Some(value)) => serde_json::from_str(&value).unwrap_or_else(|e| {
                warn!("Stored state is not valid JSON ({}), starting fresh", e);
                AlertState::default()
            }),
            Ok(None) => AlertState::default(),
            Err(e) => {
                error!("Error getting state: {}", e);
                AlertState::default()
            }
        }
    }

    async fn write(&self, state: &AlertState) {
        let value = match serde_json::to_string(state) {
            Ok(value) => value,
            Err(e) => {
                error!("Error serializing state: {}", e);
                return;
            }
        };

        if let Err(e) = self.upsert_state_value(&value).await {
            error!("Error saving state: {}", e);
        }
    }
}
