//! Integration tests per gli endpoints degli utenti
//!
//! Test per:
//! - GET /users/me
//! - PATCH /users/me
//! - GET /users/{user_id}

mod common;

#[cfg(test)]
mod user_tests {
    use super::common::*;
    use axum_test::http::HeaderName;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_me() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (alice, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .get("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["id"], alice.id.as_str());
        assert_eq!(user["completed_intro"], false);
        assert_eq!(user["dietary_restrictions"], json!([]));
    }

    #[tokio::test]
    async fn test_update_me_writes_only_given_fields() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .patch("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .json(&json!({
                "dietary_restrictions": ["Vegan", "Gluten Intolerance"],
                "completed_intro": true
            }))
            .await;

        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["display_name"], "alice");
        assert_eq!(user["completed_intro"], true);
        assert_eq!(
            user["dietary_restrictions"],
            json!(["Vegan", "Gluten Intolerance"])
        );

        // la modifica è persistita
        let me: serde_json::Value = server
            .get("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await
            .json();
        assert_eq!(me["completed_intro"], true);
    }

    #[tokio::test]
    async fn test_update_me_rejects_empty_display_name() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .patch("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .json(&json!({ "display_name": "" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_update_me_rejects_unknown_dietary_option() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .patch("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .json(&json!({ "dietary_restrictions": ["Carnivore"] }))
            .await;

        response.assert_status_unprocessable_entity();
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;
        let (bob, _) = create_user(&state, "bob@example.com").await;

        let response = server
            .get(&format!("/users/{}", bob.id))
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["email"], "bob@example.com");
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .get("/users/does-not-exist")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_not_found();
    }
}
