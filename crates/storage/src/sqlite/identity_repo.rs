use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{IdentityRecord, IdentityRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl IdentityRepository for SqliteRepository {
    async fn load_identity(&self) -> Result<IdentityRecord, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT key, value
            FROM identity_kv
            WHERE key IN (?1, ?2)
            ",
        )
        .bind(IdentityRecord::PLAYER_NAME_KEY)
        .bind(IdentityRecord::SESSION_ID_KEY)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut record = IdentityRecord::default();
        for row in rows {
            let key: String = row.try_get("key").map_err(ser)?;
            let value: String = row.try_get("value").map_err(ser)?;
            match key.as_str() {
                IdentityRecord::PLAYER_NAME_KEY => record.player_name = Some(value),
                IdentityRecord::SESSION_ID_KEY => record.session_id = Some(value),
                _ => {}
            }
        }
        Ok(record)
    }

    async fn save_identity(&self, record: &IdentityRecord) -> Result<(), StorageError> {
        let entries = [
            (IdentityRecord::PLAYER_NAME_KEY, record.player_name.as_deref()),
            (IdentityRecord::SESSION_ID_KEY, record.session_id.as_deref()),
        ];

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let now = Utc::now();
        for (key, value) in entries {
            let Some(value) = value else {
                continue;
            };
            sqlx::query(
                r"
                INSERT INTO identity_kv (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
