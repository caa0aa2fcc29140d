//! Database repository for users.

use crate::types::{UserGroupId, UserId, abbrev_uuid};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{
            repository::{Repository, count_matching, ids_matching, select_matching},
            user_groups::groups_of_user,
        },
        models::{
            user_groups::UserGroupDBResponse,
            users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
        },
    },
    rest::criteria::{Column, ColumnKind, Columns, SearchCriteria},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

pub static COLUMNS: Columns = Columns {
    table: "users",
    columns: &[
        Column::new("id", "id", ColumnKind::Uuid),
        Column::new("username", "username", ColumnKind::Text).searchable(),
        Column::new("firstName", "first_name", ColumnKind::Text).searchable(),
        Column::new("lastName", "last_name", ColumnKind::Text).searchable(),
        Column::new("email", "email", ColumnKind::Text).searchable(),
        Column::new("language", "language", ColumnKind::Text),
        Column::new("locale", "locale", ColumnKind::Text),
        Column::new("timezone", "timezone", ColumnKind::Text),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
        Column::new("updatedAt", "updated_at", ColumnKind::Timestamp),
    ],
};

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub locale: String,
    pub timezone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn into_response(self, user_groups: Vec<UserGroupDBResponse>) -> UserDBResponse {
        UserDBResponse {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            language: self.language,
            locale: self.locale,
            timezone: self.timezone,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
            user_groups,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    async fn with_groups(&mut self, user: User) -> Result<UserDBResponse> {
        let groups = groups_of_user(self.db, user.id).await?;
        Ok(user.into_response(groups))
    }

    async fn with_groups_all(&mut self, users: Vec<User>) -> Result<Vec<UserDBResponse>> {
        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            responses.push(self.with_groups(user).await?);
        }
        Ok(responses)
    }

    /// Look a user up by username or email, as accepted by the login endpoint.
    #[instrument(skip(self), err)]
    pub async fn get_by_identifier(&mut self, identifier: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ? LIMIT 1")
            .bind(identifier)
            .bind(identifier)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => Ok(Some(self.with_groups(user).await?)),
            None => Ok(None),
        }
    }

    /// Members of a group, ordered by username.
    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    pub async fn list_by_group(&mut self, group_id: UserGroupId) -> Result<Vec<UserDBResponse>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            INNER JOIN user_has_user_groups ug ON ug.user_id = u.id
            WHERE ug.user_group_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(group_id)
        .fetch_all(&mut *self.db)
        .await?;

        self.with_groups_all(users).await
    }

    /// Add the user to a group. Returns `false` when the user already was a member.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), group_id = %abbrev_uuid(&group_id)), err)]
    pub async fn add_to_group(&mut self, user_id: UserId, group_id: UserGroupId) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO user_has_user_groups (user_id, user_group_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove the user from a group. Returns `false` when the user was not a member.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), group_id = %abbrev_uuid(&group_id)), err)]
    pub async fn remove_from_group(&mut self, user_id: UserId, group_id: UserGroupId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_has_user_groups WHERE user_id = ? AND user_group_id = ?")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn replace_memberships(db: &mut SqliteConnection, user_id: UserId, groups: &[UserGroupId]) -> Result<()> {
    sqlx::query("DELETE FROM user_has_user_groups WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *db)
        .await?;

    for group_id in groups {
        sqlx::query("INSERT OR IGNORE INTO user_has_user_groups (user_id, user_group_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *db)
            .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = SearchCriteria;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = sqlx::Connection::begin(&mut *self.db).await?;

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, first_name, last_name, email, language, locale, timezone, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.language)
        .bind(&request.locale)
        .bind(&request.timezone)
        .bind(&request.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        replace_memberships(&mut tx, user.id, &request.user_groups).await?;
        tx.commit().await?;

        self.with_groups(user).await
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => Ok(Some(self.with_groups(user).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = select_matching::<User>(self.db, &COLUMNS, filter).await?;
        self.with_groups_all(users).await
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64> {
        count_matching(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self, filter), err)]
    async fn ids(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Id>> {
        ids_matching::<UserId>(self.db, &COLUMNS, filter).await
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = sqlx::Connection::begin(&mut *self.db).await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE(?, username),
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                email = COALESCE(?, email),
                language = COALESCE(?, language),
                locale = COALESCE(?, locale),
                timezone = COALESCE(?, timezone),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.language)
        .bind(&request.locale)
        .bind(&request.timezone)
        .bind(&request.password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(groups) = &request.user_groups {
            replace_memberships(&mut tx, id, groups).await?;
        }
        tx.commit().await?;

        self.with_groups(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;
    use crate::db::handlers::UserGroups;
    use crate::db::models::user_groups::UserGroupCreateDBRequest;
    use crate::test_utils::create_test_pool;

    fn user(username: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: username.to_string(),
            email: format!("{username}@example.com"),
            language: "en".to_string(),
            locale: "en".to_string(),
            timezone: "Europe/Helsinki".to_string(),
            password_hash: "hash".to_string(),
            user_groups: Vec::new(),
        }
    }

    async fn group(conn: &mut SqliteConnection, name: &str, role: Role) -> UserGroupId {
        UserGroups::new(conn)
            .create(&UserGroupCreateDBRequest {
                name: name.to_string(),
                role,
            })
            .await
            .unwrap()
            .id
    }

    #[test_log::test(tokio::test)]
    async fn test_create_user_with_groups() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let admins = group(&mut conn, "Admins", Role::Admin).await;

        let mut repo = Users::new(&mut conn);
        let mut request = user("john");
        request.user_groups = vec![admins];
        let created = repo.create(&request).await.unwrap();

        assert_eq!(created.username, "john");
        assert_eq!(created.user_groups.len(), 1);
        assert_eq!(created.roles(), vec![Role::Logged, Role::User, Role::Admin]);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "john@example.com");
        assert_eq!(fetched.user_groups[0].id, admins);
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_username_and_email_rejected() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&user("john")).await.unwrap();

        let mut same_name = user("john");
        same_name.email = "other@example.com".to_string();
        match repo.create(&same_name).await {
            Err(DbError::UniqueViolation { table, constraint, .. }) => {
                assert_eq!(table.as_deref(), Some("users"));
                assert_eq!(constraint.as_deref(), Some("username"));
            }
            other => panic!("Expected unique violation, got {other:?}"),
        }

        let mut same_email = user("jane");
        same_email.email = "john@example.com".to_string();
        assert!(matches!(repo.create(&same_email).await, Err(DbError::UniqueViolation { .. })));

        // Failed creates leave nothing behind
        assert_eq!(repo.count(&SearchCriteria::default()).await.unwrap(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_get_by_identifier() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let created = repo.create(&user("john")).await.unwrap();

        let by_username = repo.get_by_identifier("john").await.unwrap().unwrap();
        let by_email = repo.get_by_identifier("john@example.com").await.unwrap().unwrap();
        assert_eq!(by_username.id, created.id);
        assert_eq!(by_email.id, created.id);
        assert!(repo.get_by_identifier("nobody").await.unwrap().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_replaces_only_given_fields() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let admins = group(&mut conn, "Admins", Role::Admin).await;
        let users = group(&mut conn, "Users", Role::User).await;

        let mut repo = Users::new(&mut conn);
        let mut request = user("john");
        request.user_groups = vec![admins];
        let created = repo.create(&request).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    first_name: Some("Johnny".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Johnny");
        assert_eq!(updated.last_name, "john");
        assert_eq!(updated.user_groups.len(), 1);

        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    user_groups: Some(vec![users]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.user_groups.len(), 1);
        assert_eq!(updated.user_groups[0].id, users);

        let missing = repo.update(Uuid::new_v4(), &UserUpdateDBRequest::default()).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[test_log::test(tokio::test)]
    async fn test_group_membership() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let admins = group(&mut conn, "Admins", Role::Admin).await;

        let mut repo = Users::new(&mut conn);
        let john = repo.create(&user("john")).await.unwrap();
        let jane = repo.create(&user("jane")).await.unwrap();

        assert!(repo.add_to_group(john.id, admins).await.unwrap());
        assert!(!repo.add_to_group(john.id, admins).await.unwrap());
        assert!(repo.add_to_group(jane.id, admins).await.unwrap());

        let members = repo.list_by_group(admins).await.unwrap();
        let names: Vec<_> = members.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["jane", "john"]);

        assert!(repo.remove_from_group(john.id, admins).await.unwrap());
        assert!(!repo.remove_from_group(john.id, admins).await.unwrap());
        assert_eq!(repo.list_by_group(admins).await.unwrap().len(), 1);

        // Deleting a user drops its memberships
        assert!(repo.delete(jane.id).await.unwrap());
        assert!(repo.list_by_group(admins).await.unwrap().is_empty());
    }
}
