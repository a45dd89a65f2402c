use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::db::AppState;
use crate::error::AppError;
use crate::jwt;
use crate::util::extract_bearer_token;

/// Identity of the authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Verify the bearer token and build the caller's context.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".into()))?;

    let claims = jwt::verify_token(&state.jwt_key, token)?;
    let user_id = claims
        .subject
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

    Ok(AuthContext {
        user_id,
        email: claims.custom.email,
        name: claims.custom.name,
        roles: claims.custom.roles,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = authenticate(&state, request.headers())?;
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
