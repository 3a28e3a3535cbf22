//! SQLite Visit Counter
//!
//! 单行计数器（id = 1），自增在一条 UPSERT 语句内完成

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{RepositoryError, VisitCount, VisitCounterPort};

/// SQLite Visit Counter
pub struct SqliteVisitCounter {
    pool: DbPool,
}

impl SqliteVisitCounter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct VisitRow {
    count: i64,
    updated_at: String,
}

impl TryFrom<VisitRow> for VisitCount {
    type Error = RepositoryError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(VisitCount {
            count: row.count,
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl VisitCounterPort for SqliteVisitCounter {
    async fn increment(&self) -> Result<VisitCount, RepositoryError> {
        let row: VisitRow = sqlx::query_as(
            r#"
            INSERT INTO visits (id, count, updated_at)
            VALUES (1, 1, ?)
            ON CONFLICT(id) DO UPDATE SET
                count = count + 1,
                updated_at = excluded.updated_at
            RETURNING count, updated_at
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let visit = VisitCount::try_from(row)?;
        tracing::debug!(count = visit.count, "Visit recorded");
        Ok(visit)
    }

    async fn current(&self) -> Result<VisitCount, RepositoryError> {
        let row: Option<VisitRow> =
            sqlx::query_as("SELECT count, updated_at FROM visits WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => VisitCount::try_from(row),
            None => Ok(VisitCount {
                count: 0,
                updated_at: Utc::now(),
            }),
        }
    }
}
