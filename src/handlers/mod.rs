mod auth;
mod coupons;
mod dev;
mod orders;
mod products;
mod roles;
mod users;

pub use auth::*;
pub use coupons::*;
pub use dev::*;
pub use orders::*;
pub use products::*;
pub use roles::*;
pub use users::*;

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::AppState;
use crate::middleware::{require_admin, require_auth};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes reachable with any valid token. Admin-only operations on
/// these resources check the role inside the handler.
fn authed_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/validate", post(validate_coupon))
        .route("/coupons/code/{code}", get(get_coupon_by_code))
        .route(
            "/coupons/{id}",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .layer(middleware::from_fn_with_state(state, require_auth))
}

/// User and role administration, gated by the admin role up front.
fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", delete(delete_user))
        .route("/roles", post(create_role))
        .route("/roles", get(list_roles))
        .route("/roles/{id}", get(get_role))
        .route("/roles/{id}", put(update_role))
        .route("/roles/{id}", delete(delete_role))
        .layer(middleware::from_fn_with_state(state, require_admin))
}

pub fn app(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/auth/login", post(login))
        .merge(authed_router(state.clone()))
        .merge(admin_router(state.clone()));

    if state.dev_mode {
        api = api.route("/dev/seed", post(seed));
    }

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
