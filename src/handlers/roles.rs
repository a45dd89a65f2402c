use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateRole, Role, UpdateRole};

pub async fn create_role(
    State(state): State<AppState>,
    Json(input): Json<CreateRole>,
) -> Result<Json<Role>> {
    input.validate()?;

    let conn = state.db.get()?;
    if queries::get_role_by_name(&conn, &input.name)?.is_some() {
        return Err(AppError::BadRequest("Role name already exists".into()));
    }

    let role = queries::create_role(&conn, &input)?;
    Ok(Json(role))
}

pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_roles(&conn)?))
}

pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Role>> {
    let conn = state.db.get()?;
    let role = queries::get_role_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
    Ok(Json(role))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRole>,
) -> Result<Json<Role>> {
    let conn = state.db.get()?;

    queries::get_role_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;

    if let Some(ref name) = input.name {
        if let Some(existing) = queries::get_role_by_name(&conn, name)? {
            if existing.id != id {
                return Err(AppError::BadRequest("Role name already exists".into()));
            }
        }
    }

    queries::update_role(&conn, &id, &input)?;

    let role = queries::get_role_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
    Ok(Json(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !queries::delete_role(&conn, &id)? {
        return Err(AppError::NotFound("Role not found".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
