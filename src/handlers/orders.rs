use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{CreateOrder, Order, UpdateOrder};
use crate::orders;

pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrder>,
) -> Result<Json<Order>> {
    let mut conn = state.db.get()?;
    let order = orders::place_order(&mut conn, &input)?;
    Ok(Json(order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Orden no encontrada".into()))?;
    Ok(Json(order))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Order>>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    let conn = state.db.get()?;
    Ok(Json(queries::list_orders(&conn)?))
}

pub async fn update_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOrder>,
) -> Result<Json<Order>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }

    let conn = state.db.get()?;
    queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Orden no encontrada".into()))?;

    queries::update_order(&conn, &id, &input)?;

    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Orden no encontrada".into()))?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }

    let conn = state.db.get()?;
    if !queries::delete_order(&conn, &id)? {
        return Err(AppError::NotFound("Orden no encontrada".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
