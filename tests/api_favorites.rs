//! Integration tests per gli endpoints dei preferiti e del catalogo
//!
//! Test per:
//! - GET /favorites
//! - POST /favorites
//! - DELETE /favorites/{restaurant_id}
//! - GET /restaurants/{restaurant_id}

mod common;

#[cfg(test)]
mod favorite_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::http::HeaderName;

    #[tokio::test]
    async fn test_save_and_list_favorites() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        for id in ["place-a", "place-b"] {
            let response = server
                .post("/favorites")
                .add_header(HeaderName::from_static("authorization"), bearer(&token))
                .json(&restaurant(id))
                .await;
            response.assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/favorites")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_ok();
        let favorites: Vec<serde_json::Value> = response.json();
        assert_eq!(favorites.len(), 2);
        for favorite in &favorites {
            assert!(favorite.get("added_at").is_some());
            assert!(
                favorite["restaurant"].is_object(),
                "Ogni preferito deve portare i dati del catalogo"
            );
        }
    }

    #[tokio::test]
    async fn test_save_favorite_twice_keeps_one() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        for _ in 0..2 {
            server
                .post("/favorites")
                .add_header(HeaderName::from_static("authorization"), bearer(&token))
                .json(&restaurant("place-a"))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let favorites: Vec<serde_json::Value> = server
            .get("/favorites")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await
            .json();
        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_save_favorite_keeps_fresh_catalog_record() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (alice, _) = create_user(&state, "alice@example.com").await;
        let (_, bob_token) = create_user(&state, "bob@example.com").await;
        add_favorite(&state, &alice.id, "place-a").await;

        let mut renamed = restaurant("place-a");
        renamed.name = "Nome inventato".to_string();
        renamed.address = "Altrove".to_string();
        let response = server
            .post("/favorites")
            .add_header(HeaderName::from_static("authorization"), bearer(&bob_token))
            .json(&renamed)
            .await;
        response.assert_status(StatusCode::CREATED);
        let favorite: serde_json::Value = response.json();
        assert_eq!(favorite["restaurant"]["name"], "Ristorante place-a");

        let catalog: serde_json::Value = server
            .get("/restaurants/place-a")
            .add_header(HeaderName::from_static("authorization"), bearer(&bob_token))
            .await
            .json();
        assert_eq!(catalog["name"], "Ristorante place-a");
        assert_eq!(catalog["address"], "Via Roma 1, Torino");
    }

    #[tokio::test]
    async fn test_save_favorite_rejects_invalid_place_id() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_user(&state, "alice@example.com").await;

        let response = server
            .post("/favorites")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .json(&restaurant("../../etc"))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_favorites_are_per_user() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (alice, _) = create_user(&state, "alice@example.com").await;
        let (_, bob_token) = create_user(&state, "bob@example.com").await;
        add_favorite(&state, &alice.id, "place-a").await;

        let favorites: Vec<serde_json::Value> = server
            .get("/favorites")
            .add_header(HeaderName::from_static("authorization"), bearer(&bob_token))
            .await
            .json();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (alice, token) = create_user(&state, "alice@example.com").await;
        add_favorite(&state, &alice.id, "place-a").await;

        let response = server
            .delete("/favorites/place-a")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        // una seconda rimozione non trova più il preferito
        let response = server
            .delete("/favorites/place-a")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;
        response.assert_status_not_found();

        // il catalogo conserva il ristorante
        let response = server
            .get("/restaurants/place-a")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_get_restaurant() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (alice, token) = create_user(&state, "alice@example.com").await;
        add_favorite(&state, &alice.id, "place-a").await;

        let response = server
            .get("/restaurants/place-a")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_ok();
        let restaurant: serde_json::Value = response.json();
        assert_eq!(restaurant["id"], "place-a");
        assert_eq!(restaurant["name"], "Ristorante place-a");

        let response = server
            .get("/restaurants/unknown")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;
        response.assert_status_not_found();
    }
}
