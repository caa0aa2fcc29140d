//! API key controller: the generic CRUD actions, root only.

use axum::{Router, routing::get};

use crate::{AppState, auth::roles::role, resources::ApiKeyResource, rest::actions};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/api_key",
            get(actions::find::<ApiKeyResource, role::Root>).post(actions::create::<ApiKeyResource, role::Root>),
        )
        .route("/v1/api_key/count", get(actions::count::<ApiKeyResource, role::Root>))
        .route("/v1/api_key/ids", get(actions::ids::<ApiKeyResource, role::Root>))
        .route(
            "/v1/api_key/{id}",
            get(actions::find_one::<ApiKeyResource, role::Root>)
                .put(actions::update::<ApiKeyResource, role::Root>)
                .patch(actions::patch::<ApiKeyResource, role::Root>)
                .delete(actions::delete::<ApiKeyResource, role::Root>),
        )
}

#[cfg(test)]
mod tests {
    use crate::auth::roles::Role;
    use crate::test_utils::{bearer_token, create_test_group, create_test_server, create_test_user};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_api_key_lifecycle() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);
        let admin = bearer_token(&create_test_user(&state.db, "admin", &[Role::Admin]).await, &state.config);
        let group = create_test_group(&state.db, "Readers", Role::Admin).await;

        server
            .get("/v1/api_key")
            .add_header("authorization", admin.as_str())
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/v1/api_key")
            .add_header("authorization", root.as_str())
            .json(&json!({"description": "Deploys", "userGroups": [group.id]}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let key: Value = response.json();
        let token = key["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 40);
        assert_eq!(key["roles"], json!(["ROLE_LOGGED", "ROLE_USER", "ROLE_ADMIN", "ROLE_API"]));

        // The new key authenticates with the roles of its groups
        server
            .get("/v1/user")
            .add_header("authorization", format!("ApiKey {token}"))
            .await
            .assert_status_ok();

        let id = key["id"].as_str().unwrap();
        let patched: Value = server
            .patch(&format!("/v1/api_key/{id}"))
            .add_header("authorization", root.as_str())
            .json(&json!({"userGroups": []}))
            .await
            .json();
        assert_eq!(patched["description"], "Deploys");
        assert_eq!(patched["roles"], json!(["ROLE_LOGGED", "ROLE_API"]));

        server
            .get("/v1/user")
            .add_header("authorization", format!("ApiKey {token}"))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .delete(&format!("/v1/api_key/{id}"))
            .add_header("authorization", root.as_str())
            .await
            .assert_status_ok();
        server
            .get("/v1/user")
            .add_header("authorization", format!("ApiKey {token}"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
