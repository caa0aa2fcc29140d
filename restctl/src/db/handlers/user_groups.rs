//! Database repository for user groups.

use crate::types::{ApiKeyId, UserGroupId, UserId, abbrev_uuid};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{
            repository::{Repository, count_matching, ids_matching, select_matching},
            roles::parse_role,
        },
        models::user_groups::{UserGroupCreateDBRequest, UserGroupDBResponse, UserGroupUpdateDBRequest},
    },
    rest::criteria::{Column, ColumnKind, Columns, SearchCriteria},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

pub static COLUMNS: Columns = Columns {
    table: "user_groups",
    columns: &[
        Column::new("id", "id", ColumnKind::Uuid),
        Column::new("name", "name", ColumnKind::Text).searchable(),
        Column::new("role", "role", ColumnKind::Text).searchable(),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
        Column::new("updatedAt", "updated_at", ColumnKind::Timestamp),
    ],
};

// Database entity model
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserGroup {
    pub id: UserGroupId,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserGroup> for UserGroupDBResponse {
    type Error = DbError;

    fn try_from(group: UserGroup) -> Result<Self> {
        Ok(Self {
            id: group.id,
            role: parse_role(&group.role)?,
            name: group.name,
            created_at: group.created_at,
            updated_at: group.updated_at,
        })
    }
}

/// Groups the user belongs to, ordered by name.
pub(crate) async fn groups_of_user(db: &mut SqliteConnection, user_id: UserId) -> Result<Vec<UserGroupDBResponse>> {
    sqlx::query_as::<_, UserGroup>(
        r#"
        SELECT g.* FROM user_groups g
        INNER JOIN user_has_user_groups ug ON ug.user_group_id = g.id
        WHERE ug.user_id = ?
        ORDER BY g.name, g.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *db)
    .await?
    .into_iter()
    .map(TryInto::try_into)
    .collect()
}

/// Groups the API key belongs to, ordered by name.
pub(crate) async fn groups_of_api_key(db: &mut SqliteConnection, api_key_id: ApiKeyId) -> Result<Vec<UserGroupDBResponse>> {
    sqlx::query_as::<_, UserGroup>(
        r#"
        SELECT g.* FROM user_groups g
        INNER JOIN api_key_has_user_groups ag ON ag.user_group_id = g.id
        WHERE ag.api_key_id = ?
        ORDER BY g.name, g.id
        "#,
    )
    .bind(api_key_id)
    .fetch_all(&mut *db)
    .await?
    .into_iter()
    .map(TryInto::try_into)
    .collect()
}

pub struct UserGroups<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> UserGroups<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(name = %name), err)]
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<UserGroupDBResponse>> {
        let group = sqlx::query_as::<_, UserGroup>("SELECT * FROM user_groups WHERE name = ? ORDER BY created_at LIMIT 1")
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        group.map(TryInto::try_into).transpose()
    }
}

#[async_trait::async_trait]
impl<'c> Repository for UserGroups<'c> {
    type CreateRequest = UserGroupCreateDBRequest;
    type UpdateRequest = UserGroupUpdateDBRequest;
    type Response = UserGroupDBResponse;
    type Id = UserGroupId;
    type Filter = SearchCriteria;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let group = sqlx::query_as::<_, UserGroup>(
            "INSERT INTO user_groups (id, name, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        group.try_into()
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let group = sqlx::query_as::<_, UserGroup>("SELECT * FROM user_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        group.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        select_matching::<UserGroup>(self.db, &COLUMNS, filter)
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
        ids_matching::<UserGroupId>(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let group = sqlx::query_as::<_, UserGroup>(
            r#"
            UPDATE user_groups SET
                name = COALESCE(?, name),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(request.role.map(|r| r.as_str()))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        group.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;
    use crate::test_utils::create_test_pool;
    use serde_json::json;

    fn group(name: &str, role: Role) -> UserGroupCreateDBRequest {
        UserGroupCreateDBRequest {
            name: name.to_string(),
            role,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_create_get_update_delete() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = UserGroups::new(&mut conn);

        let created = repo.create(&group("Admins", Role::Admin)).await.unwrap();
        assert_eq!(created.name, "Admins");
        assert_eq!(created.role, Role::Admin);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = repo
            .update(
                created.id,
                &UserGroupUpdateDBRequest {
                    name: None,
                    role: Some(Role::Root),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Admins");
        assert_eq!(updated.role, Role::Root);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_role_is_foreign_key_violation() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        sqlx::query("DELETE FROM roles WHERE id = 'ROLE_API'")
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut repo = UserGroups::new(&mut conn);
        let result = repo.create(&group("Api", Role::Api)).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_with_criteria() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = UserGroups::new(&mut conn);

        repo.create(&group("Alpha users", Role::User)).await.unwrap();
        repo.create(&group("Beta admins", Role::Admin)).await.unwrap();
        repo.create(&group("Gamma admins", Role::Admin)).await.unwrap();

        let admins = SearchCriteria::by(&COLUMNS, "role", json!("ROLE_ADMIN")).unwrap();
        assert_eq!(repo.count(&admins).await.unwrap(), 2);

        let params = vec![
            ("search".to_string(), "admins".to_string()),
            ("order".to_string(), "-name".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        let criteria = SearchCriteria::parse(&params, &COLUMNS).unwrap();
        let found = repo.list(&criteria).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Gamma admins");

        // Count ignores pagination
        assert_eq!(repo.count(&criteria).await.unwrap(), 2);
        assert_eq!(repo.ids(&criteria).await.unwrap(), vec![found[0].id]);

        let by_name = repo.get_by_name("Alpha users").await.unwrap().unwrap();
        assert_eq!(by_name.role, Role::User);
    }
}
