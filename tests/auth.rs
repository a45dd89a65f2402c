//! Authentication and authorization: login, token verification, and
//! role gating on protected routes.

mod common;
use common::*;

use axum::http::StatusCode;
use tower::ServiceExt;

use storefront::jwt::{AuthTokenClaims, issue_token, verify_token};

#[tokio::test]
async fn login_returns_token_and_user() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_user(&conn, "ana@example.com", "correct-horse-battery", &["user"]);
    }
    let app = test_app(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            &serde_json::json!({
                "email": "Ana@Example.com",
                "password": "correct-horse-battery",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["user"]["email"], "ana@example.com");
    // Secrets never serialize.
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password_salt").is_none());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let state = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_user(&conn, "ana@example.com", "correct-horse-battery", &["user"]);
    }

    for (email, password) in [
        ("ana@example.com", "wrong-password"),
        ("nadie@example.com", "correct-horse-battery"),
    ] {
        let app = test_app(state.clone());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                &serde_json::json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let state = create_test_app_state();
    let app = test_app(state);

    let response = app
        .oneshot(get_request("/api/v1/products", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing authorization token");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let state = create_test_app_state();
    let app = test_app(state);

    let response = app
        .oneshot(get_request("/api/v1/products", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_plain_users() {
    let state = create_test_app_state();
    let token = mint_token(&state, "user-1", &["user"]);
    let app = test_app(state);

    let response = app
        .oneshot(get_request("/api/v1/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Admin role required");
}

#[tokio::test]
async fn admin_routes_accept_the_admin_role() {
    let state = create_test_app_state();
    let token = mint_token(&state, "admin-1", &["admin"]);
    let app = test_app(state);

    let response = app
        .oneshot(get_request("/api/v1/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn in_handler_admin_checks_gate_product_writes() {
    let state = create_test_app_state();
    let user_token = mint_token(&state, "user-1", &["user"]);
    let admin_token = mint_token(&state, "admin-1", &["admin"]);

    let body = serde_json::json!({ "name": "Mouse", "price": 39.99 });

    let response = test_app(state.clone())
        .oneshot(json_request("POST", "/api/v1/products", Some(&user_token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_app(state)
        .oneshot(json_request("POST", "/api/v1/products", Some(&admin_token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn token_claims_round_trip() {
    let state = create_test_app_state();

    let token = issue_token(
        &state.jwt_key,
        "user-42",
        AuthTokenClaims {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            roles: vec!["user".to_string(), "admin".to_string()],
        },
        24,
    )
    .unwrap();

    let claims = verify_token(&state.jwt_key, &token).unwrap();
    assert_eq!(claims.subject.as_deref(), Some("user-42"));
    assert_eq!(claims.custom.email, "ana@example.com");
    assert_eq!(claims.custom.roles, vec!["user", "admin"]);
}

#[test]
fn tokens_from_another_key_fail_verification() {
    let state = create_test_app_state();
    let other_key = jwt_simple::prelude::HS256Key::from_bytes(b"other-secret");

    let token = issue_token(
        &other_key,
        "user-1",
        AuthTokenClaims {
            email: "x@example.com".to_string(),
            name: "X".to_string(),
            roles: vec![],
        },
        24,
    )
    .unwrap();

    assert!(verify_token(&state.jwt_key, &token).is_err());
}
