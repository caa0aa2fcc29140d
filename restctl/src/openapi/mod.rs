//! OpenAPI documentation, served by Scalar at `/docs` and as JSON at `/docs/openapi.json`.

use serde::Deserialize;
use utoipa::{
    IntoParams, Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, auth::roles::Role, errors, resources, rest};

mod crud;

/// Query parameters accepted by the list, count and ids endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(unused)]
pub struct CriteriaParams {
    /// JSON object of column conditions, e.g. `{"role": ["ROLE_ADMIN", "ROLE_USER"]}`
    #[serde(rename = "where")]
    filter: Option<String>,
    /// `name`, `-name` or `order[name]=DESC`
    order: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    /// Space separated terms, or `{"and": [..]}` / `{"or": [..]}`
    search: Option<String>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from `/v1/auth/get_token`:\n\n```\nAuthorization: Bearer <jwt>\n```"))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "ApiKeyAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "API key token:\n\n```\nAuthorization: ApiKey <token>\n```",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "restctl", description = "Users, user groups, roles and API keys over REST."),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::get_token,
        api::handlers::profile::get_profile,
        api::handlers::profile::get_profile_roles,
        api::handlers::profile::get_profile_groups,
        api::handlers::localization::get_languages,
        api::handlers::localization::get_locales,
        api::handlers::localization::get_timezones,
        api::handlers::roles::get_inherited_roles,
        api::handlers::users::get_user_groups,
        api::handlers::users::get_user_roles,
        api::handlers::users::attach_user_group,
        api::handlers::users::detach_user_group,
        api::handlers::user_groups::get_user_group_users,
        api::handlers::user_groups::attach_user,
        api::handlers::user_groups::detach_user,
        api::handlers::system::index,
        api::handlers::system::healthz,
        api::handlers::system::version,
        crud::find_roles,
        crud::count_roles,
        crud::role_ids,
        crud::find_role,
        crud::find_user_groups,
        crud::count_user_groups,
        crud::user_group_ids,
        crud::find_user_group,
        crud::create_user_group,
        crud::update_user_group,
        crud::patch_user_group,
        crud::delete_user_group,
        crud::find_users,
        crud::count_users,
        crud::user_ids,
        crud::find_user,
        crud::create_user,
        crud::update_user,
        crud::patch_user,
        crud::delete_user,
        crud::find_api_keys,
        crud::count_api_keys,
        crud::api_key_ids,
        crud::find_api_key,
        crud::create_api_key,
        crud::update_api_key,
        crud::patch_api_key,
        crud::delete_api_key,
    ),
    components(
        schemas(
            Role,
            errors::ErrorBody,
            errors::Violation,
            rest::actions::CountResponse,
            resources::UserDto,
            resources::UserGroupDto,
            resources::ApiKeyDto,
            api::models::auth::GetTokenRequest,
            api::models::auth::TokenResponse,
            api::models::users::UserResponse,
            api::models::users::ProfileResponse,
            api::models::user_groups::UserGroupResponse,
            api::models::roles::RoleResponse,
            api::models::api_keys::ApiKeyResponse,
            api::models::localization::TimezoneResponse,
            api::models::system::HealthzResponse,
            api::models::system::VersionResponse,
        )
    ),
    tags(
        (name = "auth", description = "Token issuing"),
        (name = "profile", description = "The authenticated user"),
        (name = "localization", description = "Selectable languages, locales and timezones"),
        (name = "role", description = "The role hierarchy. Roles are fixed."),
        (name = "user_group", description = "Groups grant their role to their members"),
        (name = "user", description = "User accounts"),
        (name = "api_key", description = "API keys for machine clients"),
        (name = "system", description = "Health and version"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_generic_and_custom_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/v1/auth/get_token",
            "/v1/user",
            "/v1/user/{id}",
            "/v1/user_group/{id}/user/{user_id}",
            "/v1/api_key/count",
            "/v1/role/{role}/inherited",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("BearerAuth"));
        assert!(components.security_schemes.contains_key("ApiKeyAuth"));
    }
}
