//! Users as a REST resource.

use serde::Deserialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    AppState,
    api::models::users::UserResponse,
    auth::{
        current_user::Principal,
        password::{Argon2Params, hash_password_blocking},
    },
    db::{
        handlers::{Users, users::COLUMNS},
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    errors::{Error, Result, Violation},
    resources::{NOT_A_CHOICE, NOT_BLANK},
    rest::{
        criteria::Columns,
        dto::{Action, Properties, RestDto, validate_with},
        resource::RestResource,
    },
    types::{UserGroupId, UserId},
};

/// Languages and locales a user can pick.
pub const LANGUAGES: [&str; 2] = ["en", "fi"];
pub const LOCALES: [&str; 2] = ["en", "fi"];

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_TIMEZONE: &str = "Europe/Helsinki";

crate::rest_dto! {
    #[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDto {
        #[validate(length(min = 2, max = 255, message = "This value should have between 2 and 255 characters."))]
        username: String => "username",
        #[validate(length(min = 2, max = 255, message = "This value should have between 2 and 255 characters."))]
        first_name: String => "firstName",
        #[validate(length(min = 2, max = 255, message = "This value should have between 2 and 255 characters."))]
        last_name: String => "lastName",
        #[validate(email(message = "This value is not a valid email address."))]
        email: String => "email",
        language: String => "language",
        locale: String => "locale",
        timezone: String => "timezone",
        password: String => "password",
        #[schema(value_type = Vec<String>)]
        user_groups: Vec<UserGroupId> => "userGroups",
    }
}

impl RestDto for UserDto {
    type Entity = UserDBResponse;

    fn load(&mut self, entity: &UserDBResponse) {
        self.username = entity.username.clone();
        self.first_name = entity.first_name.clone();
        self.last_name = entity.last_name.clone();
        self.email = entity.email.clone();
        self.language = entity.language.clone();
        self.locale = entity.locale.clone();
        self.timezone = entity.timezone.clone();
        self.user_groups = entity.user_groups.iter().map(|g| g.id).collect();
    }

    fn validate_for(&self, action: Action) -> Result<()> {
        let mut extra = Vec::new();
        if !self.language.is_empty() && !LANGUAGES.contains(&self.language.as_str()) {
            extra.push(Violation::new("language", NOT_A_CHOICE));
        }
        if !self.locale.is_empty() && !LOCALES.contains(&self.locale.as_str()) {
            extra.push(Violation::new("locale", NOT_A_CHOICE));
        }
        if !self.timezone.is_empty() && self.timezone.parse::<chrono_tz::Tz>().is_err() {
            extra.push(Violation::new("timezone", "This value is not a valid timezone."));
        }
        if action == Action::Create && self.password.is_empty() {
            extra.push(Violation::new("password", NOT_BLANK));
        }
        validate_with(self, extra)
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() { default } else { value }.to_string()
}

/// Check the configured minimum length and hash.
async fn hash_new_password(state: &AppState, password: &str) -> Result<String> {
    let min_length = state.config.auth.password.min_length;
    if password.chars().count() < min_length {
        return Err(Error::Validation {
            violations: vec![Violation::new(
                "password",
                format!("This value is too short. It should have {min_length} characters or more."),
            )],
        });
    }

    hash_password_blocking(password.to_string(), Argon2Params::from(&state.config.auth.password)).await
}

pub struct UserResource;

#[async_trait::async_trait]
impl RestResource for UserResource {
    const NAME: &'static str = "User";

    type Id = UserId;
    type Entity = UserDBResponse;
    type Dto = UserDto;
    type Response = UserResponse;
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Repository<'c> = Users<'c>;

    fn columns() -> &'static Columns {
        &COLUMNS
    }

    fn repository(db: &mut SqliteConnection) -> Users<'_> {
        Users::new(db)
    }

    async fn create_request(state: &AppState, dto: &UserDto) -> Result<UserCreateDBRequest> {
        Ok(UserCreateDBRequest {
            username: dto.username.clone(),
            first_name: dto.first_name.clone(),
            last_name: dto.last_name.clone(),
            email: dto.email.clone(),
            language: or_default(&dto.language, DEFAULT_LANGUAGE),
            locale: or_default(&dto.locale, DEFAULT_LOCALE),
            timezone: or_default(&dto.timezone, DEFAULT_TIMEZONE),
            password_hash: hash_new_password(state, &dto.password).await?,
            user_groups: dto.user_groups.clone(),
        })
    }

    async fn update_request(state: &AppState, dto: &UserDto) -> Result<UserUpdateDBRequest> {
        let visited = |property: &str, value: &String| dto.is_visited(property).then(|| value.clone());

        // An empty password leaves the current one in place
        let password_hash = if dto.is_visited("password") && !dto.password.is_empty() {
            Some(hash_new_password(state, &dto.password).await?)
        } else {
            None
        };

        Ok(UserUpdateDBRequest {
            username: visited("username", &dto.username),
            first_name: visited("firstName", &dto.first_name),
            last_name: visited("lastName", &dto.last_name),
            email: visited("email", &dto.email),
            language: visited("language", &dto.language),
            locale: visited("locale", &dto.locale),
            timezone: visited("timezone", &dto.timezone),
            password_hash,
            user_groups: dto.is_visited("userGroups").then(|| dto.user_groups.clone()),
        })
    }

    async fn before_delete(principal: &Principal, entity: &UserDBResponse) -> Result<()> {
        if principal.user_id() == Some(entity.id) {
            return Err(Error::BadRequest {
                message: "You cannot remove yourself...".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::test_utils::{create_test_state, root_principal};
    use serde_json::json;

    fn john() -> serde_json::Value {
        json!({
            "username": "john",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@example.com",
            "password": "password123",
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_create_hashes_password_and_applies_defaults() {
        let (state, _dir) = create_test_state().await;
        let mut conn = state.db.acquire().await.unwrap();

        let dto = UserDto::from_json(john()).unwrap();
        let user = UserResource::create(&state, &mut conn, &dto).await.unwrap();

        assert_eq!(user.language, "en");
        assert_eq!(user.locale, "en");
        assert_eq!(user.timezone, "Europe/Helsinki");
        assert!(verify_password("password123", &user.password_hash).unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_create_validation() {
        let (state, _dir) = create_test_state().await;
        let mut conn = state.db.acquire().await.unwrap();

        let mut body = john();
        body["email"] = json!("not-an-email");
        body["language"] = json!("sv");
        body["timezone"] = json!("Mars/Olympus");
        body["password"] = json!("");
        let dto = UserDto::from_json(body).unwrap();

        match UserResource::create(&state, &mut conn, &dto).await {
            Err(Error::Validation { violations }) => {
                let paths: Vec<_> = violations.iter().map(|v| v.property_path.as_str()).collect();
                assert_eq!(paths, vec!["email", "language", "password", "timezone"]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }

        let mut body = john();
        body["password"] = json!("short");
        let dto = UserDto::from_json(body).unwrap();
        assert!(matches!(
            UserResource::create(&state, &mut conn, &dto).await,
            Err(Error::Validation { violations }) if violations[0].property_path == "password"
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_patch_keeps_password_unless_sent() {
        let (state, _dir) = create_test_state().await;
        let mut conn = state.db.acquire().await.unwrap();
        let user = UserResource::create(&state, &mut conn, &UserDto::from_json(john()).unwrap())
            .await
            .unwrap();

        let dto = UserDto::from_json(json!({"firstName": "Johnny", "password": ""})).unwrap();
        let patched = UserResource::patch(&state, &mut conn, user.id, &dto).await.unwrap();
        assert_eq!(patched.first_name, "Johnny");
        assert_eq!(patched.email, "john@example.com");
        assert_eq!(patched.password_hash, user.password_hash);

        let dto = UserDto::from_json(json!({"password": "new-password"})).unwrap();
        let patched = UserResource::patch(&state, &mut conn, user.id, &dto).await.unwrap();
        assert!(verify_password("new-password", &patched.password_hash).unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_cannot_delete_yourself() {
        let (state, _dir) = create_test_state().await;
        let principal = root_principal(&state.db).await;
        let root_id = principal.user_id().unwrap();
        let mut conn = state.db.acquire().await.unwrap();

        let result = UserResource::delete(&mut conn, &principal, root_id).await;
        assert!(matches!(result, Err(Error::BadRequest { .. })));

        let user = UserResource::create(&state, &mut conn, &UserDto::from_json(john()).unwrap())
            .await
            .unwrap();
        let deleted = UserResource::delete(&mut conn, &principal, user.id).await.unwrap();
        assert_eq!(deleted.username, "john");
        assert!(UserResource::find_one(&mut conn, user.id).await.unwrap().is_none());
    }
}
