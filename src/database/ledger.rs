//! Sqlx-backed source ledger
//!
//! `imported_sources.url` carries no uniqueness constraint: marking is
//! insert-always and idempotency of the skip lives in the existence
//! check.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Database;
use crate::errors::IngestError;
use crate::ingestor::SourceLedger;

#[async_trait]
impl SourceLedger for Database {
    async fn is_imported(&self, url: &str) -> Result<bool, IngestError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM imported_sources WHERE url = ?")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn mark_imported(&self, url: &str) -> Result<(), IngestError> {
        sqlx::query("INSERT INTO imported_sources (id, url, imported_at) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(url)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
