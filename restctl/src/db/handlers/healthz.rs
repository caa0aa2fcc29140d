//! Rows written by the health endpoint to prove the database accepts writes.

use crate::db::errors::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Healthz<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Healthz<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Insert a row stamped with the current time and return that time.
    #[instrument(skip(self), err)]
    pub async fn create(&mut self) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        sqlx::query("INSERT INTO healthz (id, timestamp) VALUES (?, ?)")
            .bind(Uuid::new_v4())
            .bind(now)
            .execute(&mut *self.db)
            .await?;

        Ok(now)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM healthz WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;
    use chrono::Duration;

    #[test_log::test(tokio::test)]
    async fn test_create_and_cleanup() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Healthz::new(&mut conn);

        let first = repo.create().await.unwrap();
        repo.create().await.unwrap();

        assert_eq!(repo.delete_older_than(first - Duration::seconds(1)).await.unwrap(), 0);
        assert_eq!(repo.delete_older_than(Utc::now() + Duration::seconds(1)).await.unwrap(), 2);
    }
}
