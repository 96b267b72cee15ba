//! SQL implementation of the credential store

use crate::error::DbError;
use crate::DbClient;
use connectify_common::models::{CredentialRecord, CredentialSource};
use connectify_common::services::{BoxFuture, CredentialStore, StoreError};
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of [`CredentialStore`]; one row per user and source.
#[derive(Debug, Clone)]
pub struct SqlCredentialRepository {
    db_client: DbClient,
}

impl SqlCredentialRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing calendar credential schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS calendar_credentials (
                user_id TEXT NOT NULL,
                source TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                calendar_linked INTEGER NOT NULL DEFAULT 0,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (user_id, source)
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Calendar credential schema initialized successfully");
        Ok(())
    }

    async fn find(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT access_token, refresh_token, calendar_linked
            FROM calendar_credentials
            WHERE user_id = $1 AND source = $2
            "#,
        )
        .bind(user_id.to_string())
        .bind(source.as_str())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let access_token: String = row
            .try_get("access_token")
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let refresh_token = super::optional_text(&row, "refresh_token")
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let linked: i64 = row
            .try_get("calendar_linked")
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        CredentialRecord::new(access_token, refresh_token, linked != 0)
            .map(Some)
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "empty access token stored for user {} ({})",
                    user_id,
                    source.as_str()
                ))
            })
    }

    /// Insert or replace in a single statement.
    async fn upsert(
        &self,
        user_id: &str,
        source: CredentialSource,
        record: CredentialRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO calendar_credentials
                (user_id, source, access_token, refresh_token, calendar_linked, updated_at)
            VALUES ($1, $2, $3, $4, $5, CURRENT_TIMESTAMP)
            ON CONFLICT (user_id, source) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                calendar_linked = excluded.calendar_linked,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(user_id.to_string())
        .bind(source.as_str())
        .bind(record.access_token)
        .bind(record.refresh_token)
        .bind(i64::from(record.calendar_linked))
        .execute(self.db_client.pool())
        .await
        .map_err(query_error)?;

        debug!("Saved {} credentials for user {}", source.as_str(), user_id);
        Ok(())
    }

    async fn remove(&self, user_id: &str, source: CredentialSource) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM calendar_credentials WHERE user_id = $1 AND source = $2")
                .bind(user_id.to_string())
                .bind(source.as_str())
                .execute(self.db_client.pool())
                .await
                .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }
}

impl CredentialStore for SqlCredentialRepository {
    fn get_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, Option<CredentialRecord>, StoreError> {
        let user_id = user_id.to_string();
        Box::pin(async move { self.find(&user_id, source).await })
    }

    fn save_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
        record: CredentialRecord,
    ) -> BoxFuture<'_, (), StoreError> {
        let user_id = user_id.to_string();
        Box::pin(async move { self.upsert(&user_id, source, record).await })
    }

    fn remove_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, bool, StoreError> {
        let user_id = user_id.to_string();
        Box::pin(async move { self.remove(&user_id, source).await })
    }
}

fn query_error(err: sqlx::Error) -> StoreError {
    error!("Credential query failed: {}", err);
    DbError::from(err).into()
}
