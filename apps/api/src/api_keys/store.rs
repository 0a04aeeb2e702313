//! API key storage — one envelope per user, addressed by owner id.
//!
//! The store only ever sees vault envelopes. Encryption happens in the
//! service layer before anything reaches here.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::api_key::{ApiKeyRow, KeyType};

/// Carried in `AppState` as `Arc<dyn ApiKeyStore>`.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<ApiKeyRow>, AppError>;

    /// Inserts or replaces the user's key.
    async fn save(
        &self,
        user_id: Uuid,
        encrypted_key: &str,
        key_type: KeyType,
    ) -> Result<(), AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid) -> Result<bool, AppError>;
}

pub struct PgApiKeyStore {
    pool: PgPool,
}

impl PgApiKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PgApiKeyStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<ApiKeyRow>, AppError> {
        Ok(sqlx::query_as::<_, ApiKeyRow>(
            "SELECT user_id, encrypted_key, key_type, created_at, updated_at FROM user_api_keys WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save(
        &self,
        user_id: Uuid,
        encrypted_key: &str,
        key_type: KeyType,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_api_keys (user_id, encrypted_key, key_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET encrypted_key = EXCLUDED.encrypted_key,
                key_type = EXCLUDED.key_type,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(encrypted_key)
        .bind(key_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_api_keys WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use super::*;

    /// HashMap-backed store for service and handler tests.
    #[derive(Default)]
    pub struct InMemoryApiKeyStore {
        rows: RwLock<HashMap<Uuid, ApiKeyRow>>,
    }

    impl InMemoryApiKeyStore {
        /// Overwrites the stored envelope without going through the codec.
        pub async fn put_raw(&self, user_id: Uuid, encrypted_key: &str) {
            let now = Utc::now();
            self.rows.write().await.insert(
                user_id,
                ApiKeyRow {
                    user_id,
                    encrypted_key: encrypted_key.to_string(),
                    key_type: KeyType::Openai.as_str().to_string(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
    }

    #[async_trait]
    impl ApiKeyStore for InMemoryApiKeyStore {
        async fn get(&self, user_id: Uuid) -> Result<Option<ApiKeyRow>, AppError> {
            Ok(self.rows.read().await.get(&user_id).cloned())
        }

        async fn save(
            &self,
            user_id: Uuid,
            encrypted_key: &str,
            key_type: KeyType,
        ) -> Result<(), AppError> {
            let now = Utc::now();
            let mut rows = self.rows.write().await;
            let created_at = rows.get(&user_id).map_or(now, |r| r.created_at);
            rows.insert(
                user_id,
                ApiKeyRow {
                    user_id,
                    encrypted_key: encrypted_key.to_string(),
                    key_type: key_type.as_str().to_string(),
                    created_at,
                    updated_at: now,
                },
            );
            Ok(())
        }

        async fn delete(&self, user_id: Uuid) -> Result<bool, AppError> {
            Ok(self.rows.write().await.remove(&user_id).is_some())
        }
    }
}
