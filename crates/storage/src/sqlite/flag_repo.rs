use learn_core::model::UserId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, user_id_from_str};
use crate::repository::{AuthGateway, FlagStore, StorageError};

#[async_trait::async_trait]
impl FlagStore for SqliteRepository {
    async fn get_flag(&self, key: &str) -> Result<Option<bool>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_flags WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| r.try_get::<i64, _>("value").map(|v| v != 0).map_err(ser))
            .transpose()
    }

    async fn set_flag(&self, key: &str, value: bool) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO kv_flags (key, value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(i64::from(value))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthGateway for SqliteRepository {
    async fn current_user(&self) -> Result<Option<UserId>, StorageError> {
        let row = sqlx::query("SELECT user_id FROM auth_session WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("user_id").map_err(ser)?;
        user_id_from_str(&raw).map(Some)
    }

    async fn sign_in(&self, user: UserId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO auth_session (id, user_id)
                VALUES (1, ?1)
                ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id
            ",
        )
        .bind(user.to_string())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn sign_out(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
