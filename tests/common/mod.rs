//! Shared test fixtures: temp-file SQLite state, entity factories,
//! token minting, and request helpers for router-level tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use jwt_simple::prelude::HS256Key;
use rusqlite::Connection;

use storefront::db::{self, AppState, queries};
use storefront::handlers;
use storefront::jwt::{AuthTokenClaims, issue_token};
use storefront::models::{
    Coupon, CreateCoupon, CreateOrder, CreateProduct, CreateUser, DiscountType, OrderItem,
    Product, User,
};

pub const TEST_JWT_SECRET: &str = "test-secret-key";

/// Build an AppState over a fresh temp-file SQLite database.
///
/// The temp directory is forgotten rather than dropped so the database
/// file outlives the state for the duration of the test process.
pub fn create_test_app_state() -> AppState {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storefront-test.db");
    let path = path.to_str().unwrap().to_string();
    std::mem::forget(dir);

    let pool = db::open_pool(&path).unwrap();
    {
        let conn = pool.get().unwrap();
        db::init_schema(&conn).unwrap();
    }

    AppState {
        db: pool,
        jwt_key: HS256Key::from_bytes(TEST_JWT_SECRET.as_bytes()),
        token_ttl_hours: 24,
        dev_mode: true,
    }
}

pub fn test_app(state: AppState) -> Router {
    handlers::app(state)
}

/// Mint a token directly, without a backing user row. The middleware
/// only verifies the token, so this is enough for authorization tests.
pub fn mint_token(state: &AppState, user_id: &str, roles: &[&str]) -> String {
    issue_token(
        &state.jwt_key,
        user_id,
        AuthTokenClaims {
            email: format!("{}@example.com", user_id),
            name: user_id.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
        state.token_ttl_hours,
    )
    .unwrap()
}

pub fn create_test_user(conn: &Connection, email: &str, password: &str, roles: &[&str]) -> User {
    queries::create_user(
        conn,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
    )
    .unwrap()
}

pub fn create_test_product(conn: &Connection, name: &str, price: f64) -> Product {
    queries::create_product(
        conn,
        &CreateProduct {
            name: name.to_string(),
            description: String::new(),
            price,
            stock: 10,
            category: "test".to_string(),
            brand: "test".to_string(),
            image_url: None,
        },
    )
    .unwrap()
}

/// A valid, active, unlimited coupon. Tweak fields before passing to
/// [`create_test_coupon`] for the failure cases.
pub fn coupon_input(code: &str, discount_type: DiscountType, discount_value: f64) -> CreateCoupon {
    CreateCoupon {
        code: code.to_string(),
        discount_type,
        discount_value,
        min_purchase_amount: 0.0,
        max_uses: None,
        expiration_date: None,
        is_active: true,
    }
}

pub fn create_test_coupon(conn: &Connection, input: &CreateCoupon) -> Coupon {
    queries::create_coupon(conn, input).unwrap()
}

pub fn order_input(user_id: &str, subtotal: f64, coupon_code: Option<&str>) -> CreateOrder {
    CreateOrder {
        user_id: user_id.to_string(),
        products: vec![OrderItem {
            product_id: "product-1".to_string(),
            quantity: 1,
        }],
        description: "test order".to_string(),
        subtotal,
        coupon_code: coupon_code.map(String::from),
        status: None,
    }
}

pub fn used_count(conn: &Connection, code: &str) -> i64 {
    queries::get_coupon_by_code(conn, code)
        .unwrap()
        .expect("coupon should exist")
        .used_count
}

pub fn order_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap()
}

pub fn past_timestamp(days: i64) -> i64 {
    chrono::Utc::now().timestamp() - days * 86400
}

pub fn future_timestamp(days: i64) -> i64 {
    chrono::Utc::now().timestamp() + days * 86400
}

// ---- HTTP request helpers ----

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
