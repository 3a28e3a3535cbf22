//! SQLite Contact Repository

use async_trait::async_trait;
use chrono::Utc;

use super::DbPool;
use crate::application::ports::{ContactRecord, ContactRepositoryPort, RepositoryError};
use crate::domain::content::ContactMessage;

/// SQLite Contact Repository
pub struct SqliteContactRepository {
    pool: DbPool,
}

impl SqliteContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepositoryPort for SqliteContactRepository {
    async fn save(&self, contact: &ContactMessage) -> Result<ContactRecord, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, message, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(contact.name())
        .bind(contact.email())
        .bind(contact.message())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();
        tracing::info!(contact_id = id, "Contact message stored");

        Ok(ContactRecord { id, created_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    #[tokio::test]
    async fn test_save_assigns_increasing_ids() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteContactRepository::new(pool.clone());

        let msg = ContactMessage::new("Ada", "ada@example.com", "Hello there").unwrap();
        let first = repo.save(&msg).await.unwrap();
        let second = repo.save(&msg).await.unwrap();
        assert!(second.id > first.id);

        let (email,): (String,) = sqlx::query_as("SELECT email FROM contacts WHERE id = ?")
            .bind(first.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(email, "ada@example.com");
    }
}
