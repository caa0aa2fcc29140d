//! Documentation stubs for the generic CRUD routes.
//!
//! The routes are served by instantiations of [`crate::rest::actions`], which cannot carry
//! `#[utoipa::path]` themselves. These functions exist only to describe them.

use crate::{
    api::models::{api_keys::ApiKeyResponse, roles::RoleResponse, user_groups::UserGroupResponse, users::UserResponse},
    errors::ErrorBody,
    openapi::CriteriaParams,
    resources::{ApiKeyDto, UserDto, UserGroupDto},
    rest::actions::CountResponse,
};

#[utoipa::path(
    get,
    path = "/v1/role",
    tag = "role",
    summary = "List roles",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Matching roles", body = Vec<RoleResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_roles() {}

#[utoipa::path(
    get,
    path = "/v1/role/count",
    tag = "role",
    summary = "Count roles",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Number of matching roles", body = CountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn count_roles() {}

#[utoipa::path(
    get,
    path = "/v1/role/ids",
    tag = "role",
    summary = "Role ids",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Ids of matching roles", body = Vec<String>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn role_ids() {}

#[utoipa::path(
    get,
    path = "/v1/role/{role}",
    tag = "role",
    summary = "Get a role",
    params(("role" = String, Path, description = "Role name, e.g. ROLE_ADMIN")),
    responses(
        (status = 200, description = "The role", body = RoleResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_role() {}

#[utoipa::path(
    get,
    path = "/v1/user_group",
    tag = "user_group",
    summary = "List user groups",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Matching user groups", body = Vec<UserGroupResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_user_groups() {}

#[utoipa::path(
    get,
    path = "/v1/user_group/count",
    tag = "user_group",
    summary = "Count user groups",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Number of matching user groups", body = CountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn count_user_groups() {}

#[utoipa::path(
    get,
    path = "/v1/user_group/ids",
    tag = "user_group",
    summary = "User group ids",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Ids of matching user groups", body = Vec<String>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn user_group_ids() {}

#[utoipa::path(
    get,
    path = "/v1/user_group/{id}",
    tag = "user_group",
    summary = "Get a user group",
    params(("id" = String, Path, description = "User group ID")),
    responses(
        (status = 200, description = "The user group", body = UserGroupResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_user_group() {}

#[utoipa::path(
    post,
    path = "/v1/user_group",
    tag = "user_group",
    summary = "Create a user group",
    request_body = UserGroupDto,
    responses(
        (status = 201, description = "The created user group", body = UserGroupResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn create_user_group() {}

#[utoipa::path(
    put,
    path = "/v1/user_group/{id}",
    tag = "user_group",
    summary = "Replace a user group",
    params(("id" = String, Path, description = "User group ID")),
    request_body = UserGroupDto,
    responses(
        (status = 200, description = "The updated user group. The body is validated as a whole.", body = UserGroupResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn update_user_group() {}

#[utoipa::path(
    patch,
    path = "/v1/user_group/{id}",
    tag = "user_group",
    summary = "Update a user group",
    params(("id" = String, Path, description = "User group ID")),
    request_body = UserGroupDto,
    responses(
        (status = 200, description = "The updated user group. The body is merged onto the stored user group before validation.", body = UserGroupResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn patch_user_group() {}

#[utoipa::path(
    delete,
    path = "/v1/user_group/{id}",
    tag = "user_group",
    summary = "Delete a user group",
    params(("id" = String, Path, description = "User group ID")),
    responses(
        (status = 200, description = "The deleted user group", body = UserGroupResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn delete_user_group() {}

#[utoipa::path(
    get,
    path = "/v1/user",
    tag = "user",
    summary = "List users",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_users() {}

#[utoipa::path(
    get,
    path = "/v1/user/count",
    tag = "user",
    summary = "Count users",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Number of matching users", body = CountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn count_users() {}

#[utoipa::path(
    get,
    path = "/v1/user/ids",
    tag = "user",
    summary = "User ids",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Ids of matching users", body = Vec<String>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn user_ids() {}

#[utoipa::path(
    get,
    path = "/v1/user/{id}",
    tag = "user",
    summary = "Get a user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_user() {}

#[utoipa::path(
    post,
    path = "/v1/user",
    tag = "user",
    summary = "Create a user",
    request_body = UserDto,
    responses(
        (status = 201, description = "The created user", body = UserResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn create_user() {}

#[utoipa::path(
    put,
    path = "/v1/user/{id}",
    tag = "user",
    summary = "Replace a user",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserDto,
    responses(
        (status = 200, description = "The updated user. The body is validated as a whole.", body = UserResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn update_user() {}

#[utoipa::path(
    patch,
    path = "/v1/user/{id}",
    tag = "user",
    summary = "Update a user",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserDto,
    responses(
        (status = 200, description = "The updated user. The body is merged onto the stored user before validation.", body = UserResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn patch_user() {}

#[utoipa::path(
    delete,
    path = "/v1/user/{id}",
    tag = "user",
    summary = "Delete a user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The deleted user", body = UserResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn delete_user() {}

#[utoipa::path(
    get,
    path = "/v1/api_key",
    tag = "api_key",
    summary = "List API keys",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Matching API keys", body = Vec<ApiKeyResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_api_keys() {}

#[utoipa::path(
    get,
    path = "/v1/api_key/count",
    tag = "api_key",
    summary = "Count API keys",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Number of matching API keys", body = CountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn count_api_keys() {}

#[utoipa::path(
    get,
    path = "/v1/api_key/ids",
    tag = "api_key",
    summary = "API key ids",
    params(CriteriaParams),
    responses(
        (status = 200, description = "Ids of matching API keys", body = Vec<String>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn api_key_ids() {}

#[utoipa::path(
    get,
    path = "/v1/api_key/{id}",
    tag = "api_key",
    summary = "Get a API key",
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 200, description = "The API key", body = ApiKeyResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn find_api_key() {}

#[utoipa::path(
    post,
    path = "/v1/api_key",
    tag = "api_key",
    summary = "Create a API key",
    request_body = ApiKeyDto,
    responses(
        (status = 201, description = "The created API key", body = ApiKeyResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn create_api_key() {}

#[utoipa::path(
    put,
    path = "/v1/api_key/{id}",
    tag = "api_key",
    summary = "Replace a API key",
    params(("id" = String, Path, description = "API key ID")),
    request_body = ApiKeyDto,
    responses(
        (status = 200, description = "The updated API key. The body is validated as a whole.", body = ApiKeyResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn update_api_key() {}

#[utoipa::path(
    patch,
    path = "/v1/api_key/{id}",
    tag = "api_key",
    summary = "Update a API key",
    params(("id" = String, Path, description = "API key ID")),
    request_body = ApiKeyDto,
    responses(
        (status = 200, description = "The updated API key. The body is merged onto the stored API key before validation.", body = ApiKeyResponse),
        (status = 400, description = "Invalid request or validation failed", body = ErrorBody),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn patch_api_key() {}

#[utoipa::path(
    delete,
    path = "/v1/api_key/{id}",
    tag = "api_key",
    summary = "Delete a API key",
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 200, description = "The deleted API key", body = ApiKeyResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[allow(unused)]
pub fn delete_api_key() {}
