use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::preferences::PreferenceStore;

pub struct SqlitePreferenceStore {
    db: SqlitePool,
}

const UPSERT_PREFERENCE: &str = r#"
    INSERT INTO user_preferences (user_id, pref_key, pref_value, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(user_id, pref_key) DO UPDATE
    SET pref_value = excluded.pref_value,
        updated_at = excluded.updated_at
"#;

impl SqlitePreferenceStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT pref_value FROM user_preferences WHERE user_id = ? AND pref_key = ?",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(value)
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(UPSERT_PREFERENCE)
            .bind(user_id)
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// All keys or none: the batch runs in one transaction.
    async fn set_many(&self, user_id: &str, values: &[(&str, String)]) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.db.begin().await?;
        for (key, value) in values {
            sqlx::query(UPSERT_PREFERENCE)
                .bind(user_id)
                .bind(*key)
                .bind(value.as_str())
                .bind(now.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<(String, String), String>>,
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>, AppError> {
        let values = self.values.read().await;
        Ok(values.get(&(user_id.to_string(), key.to_string())).cloned())
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), AppError> {
        let mut values = self.values.write().await;
        values.insert((user_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn set_many(&self, user_id: &str, batch: &[(&str, String)]) -> Result<(), AppError> {
        let mut values = self.values.write().await;
        for (key, value) in batch {
            values.insert((user_id.to_string(), key.to_string()), value.clone());
        }
        Ok(())
    }
}
