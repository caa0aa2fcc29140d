//! Database repository for roles.
//!
//! Roles are seeded by the migrations. `create` and `update` complete the [`Repository`]
//! contract and are used from tests only; no route writes roles.

use crate::{
    auth::roles::Role,
    db::{
        errors::{DbError, Result},
        handlers::repository::{Repository, count_matching, ids_matching, select_matching},
        models::roles::{RoleCreateDBRequest, RoleDBResponse, RoleUpdateDBRequest},
    },
    rest::criteria::{Column, ColumnKind, Columns, SearchCriteria},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

pub static COLUMNS: Columns = Columns {
    table: "roles",
    columns: &[
        Column::new("id", "id", ColumnKind::Text).searchable(),
        Column::new("description", "description", ColumnKind::Text).searchable(),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
        Column::new("updatedAt", "updated_at", ColumnKind::Timestamp),
    ],
};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct RoleRow {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn parse_role(value: &str) -> Result<Role> {
    value.parse().map_err(|e| DbError::Other(anyhow::Error::new(e)))
}

impl TryFrom<RoleRow> for RoleDBResponse {
    type Error = DbError;

    fn try_from(row: RoleRow) -> Result<Self> {
        Ok(Self {
            id: parse_role(&row.id)?,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct Roles<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Roles<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Roles<'c> {
    type CreateRequest = RoleCreateDBRequest;
    type UpdateRequest = RoleUpdateDBRequest;
    type Response = RoleDBResponse;
    type Id = Role;
    type Filter = SearchCriteria;

    #[instrument(skip(self, request), fields(role = %request.id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, RoleRow>(
            "INSERT INTO roles (id, description, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(request.id.as_str())
        .bind(&request.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(role = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT * FROM roles WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        select_matching::<RoleRow>(self.db, &COLUMNS, filter)
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        count_matching(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self, filter), err)]
    async fn ids(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Id>> {
        ids_matching::<String>(self.db, &COLUMNS, filter)
            .await?
            .iter()
            .map(|id| parse_role(id))
            .collect()
    }

    #[instrument(skip(self), fields(role = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(role = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, RoleRow>(
            "UPDATE roles SET description = COALESCE(?, description), updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&request.description)
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_roles_are_seeded() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Roles::new(&mut conn);

        let roles = repo.list(&SearchCriteria::default()).await.unwrap();
        let mut ids: Vec<Role> = roles.iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, Role::ALL.to_vec());

        let admin = repo.get_by_id(Role::Admin).await.unwrap().unwrap();
        assert_eq!(admin.description, "Description - ROLE_ADMIN");
    }

    #[test_log::test(tokio::test)]
    async fn test_criteria_and_update() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Roles::new(&mut conn);

        let criteria = SearchCriteria::by(&COLUMNS, "id", json!("ROLE_ROOT")).unwrap();
        assert_eq!(repo.count(&criteria).await.unwrap(), 1);
        assert_eq!(repo.ids(&criteria).await.unwrap(), vec![Role::Root]);

        let updated = repo
            .update(
                Role::Root,
                &RoleUpdateDBRequest {
                    description: Some("Super user".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Super user");

        let untouched = repo.update(Role::Root, &RoleUpdateDBRequest::default()).await.unwrap();
        assert_eq!(untouched.description, "Super user");
    }
}
