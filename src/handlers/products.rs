use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{CreateProduct, Product, UpdateProduct};

pub async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateProduct>,
) -> Result<Json<Product>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    input.validate()?;

    let conn = state.db.get()?;
    let product = queries::create_product(&conn, &input)?;
    Ok(Json(product))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_products(&conn)?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }

    let conn = state.db.get()?;
    queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    queries::update_product(&conn, &id, &input)?;

    let product = queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }

    let conn = state.db.get()?;
    if !queries::delete_product(&conn, &id)? {
        return Err(AppError::NotFound("Product not found".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
