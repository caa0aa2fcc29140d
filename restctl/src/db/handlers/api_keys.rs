//! Database repository for API keys.

use crate::types::{ApiKeyId, UserGroupId, abbrev_uuid};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{
            repository::{Repository, count_matching, ids_matching, select_matching},
            user_groups::groups_of_api_key,
        },
        models::api_keys::{ApiKeyCreateDBRequest, ApiKeyDBResponse, ApiKeyUpdateDBRequest},
    },
    rest::criteria::{Column, ColumnKind, Columns, SearchCriteria},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

pub static COLUMNS: Columns = Columns {
    table: "api_keys",
    columns: &[
        Column::new("id", "id", ColumnKind::Uuid),
        Column::new("token", "token", ColumnKind::Text).searchable(),
        Column::new("description", "description", ColumnKind::Text).searchable(),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
        Column::new("updatedAt", "updated_at", ColumnKind::Timestamp),
    ],
};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct ApiKey {
    pub id: ApiKeyId,
    pub token: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct ApiKeys<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> ApiKeys<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    async fn with_groups(&mut self, key: ApiKey) -> Result<ApiKeyDBResponse> {
        let user_groups = groups_of_api_key(self.db, key.id).await?;
        Ok(ApiKeyDBResponse {
            id: key.id,
            token: key.token,
            description: key.description,
            created_at: key.created_at,
            updated_at: key.updated_at,
            user_groups,
        })
    }

    /// Resolve the key presented in an `Authorization: ApiKey <token>` header.
    #[instrument(skip_all, err)]
    pub async fn get_by_token(&mut self, token: &str) -> Result<Option<ApiKeyDBResponse>> {
        let key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE token = ?")
            .bind(token)
            .fetch_optional(&mut *self.db)
            .await?;

        match key {
            Some(key) => Ok(Some(self.with_groups(key).await?)),
            None => Ok(None),
        }
    }
}

async fn replace_memberships(db: &mut SqliteConnection, api_key_id: ApiKeyId, groups: &[UserGroupId]) -> Result<()> {
    sqlx::query("DELETE FROM api_key_has_user_groups WHERE api_key_id = ?")
        .bind(api_key_id)
        .execute(&mut *db)
        .await?;

    for group_id in groups {
        sqlx::query("INSERT OR IGNORE INTO api_key_has_user_groups (api_key_id, user_group_id) VALUES (?, ?)")
            .bind(api_key_id)
            .bind(group_id)
            .execute(&mut *db)
            .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl<'c> Repository for ApiKeys<'c> {
    type CreateRequest = ApiKeyCreateDBRequest;
    type UpdateRequest = ApiKeyUpdateDBRequest;
    type Response = ApiKeyDBResponse;
    type Id = ApiKeyId;
    type Filter = SearchCriteria;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = sqlx::Connection::begin(&mut *self.db).await?;

        let now = Utc::now();
        let key = sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys (id, token, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&request.token)
        .bind(&request.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        replace_memberships(&mut tx, key.id, &request.user_groups).await?;
        tx.commit().await?;

        self.with_groups(key).await
    }

    #[instrument(skip(self), fields(api_key_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match key {
            Some(key) => Ok(Some(self.with_groups(key).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let keys = select_matching::<ApiKey>(self.db, &COLUMNS, filter).await?;
        let mut responses = Vec::with_capacity(keys.len());
        for key in keys {
            responses.push(self.with_groups(key).await?);
        }
        Ok(responses)
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        count_matching(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self, filter), err)]
    async fn ids(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Id>> {
        ids_matching::<ApiKeyId>(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self), fields(api_key_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(api_key_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = sqlx::Connection::begin(&mut *self.db).await?;

        let key = sqlx::query_as::<_, ApiKey>(
            "UPDATE api_keys SET description = COALESCE(?, description), updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&request.description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(groups) = &request.user_groups {
            replace_memberships(&mut tx, id, groups).await?;
        }
        tx.commit().await?;

        self.with_groups(key).await
    }
}
