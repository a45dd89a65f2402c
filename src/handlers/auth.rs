use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::jwt::{self, AuthTokenClaims};
use crate::models::User;
use crate::util::verify_password;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let conn = state.db.get()?;

    // Same error for unknown email and wrong password.
    let user = queries::get_user_by_email(&conn, &input.email)?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&user.password_salt, &input.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = jwt::issue_token(
        &state.jwt_key,
        &user.id,
        AuthTokenClaims {
            email: user.email.clone(),
            name: user.name.clone(),
            roles: user.roles.clone(),
        },
        state.token_ttl_hours,
    )?;

    Ok(Json(LoginResponse { token, user }))
}
