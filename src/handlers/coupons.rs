use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::coupons;
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{Coupon, CreateCoupon, DiscountType, UpdateCoupon};

fn require_admin(ctx: &AuthContext) -> Result<()> {
    if !ctx.has_role("admin") {
        return Err(AppError::Forbidden("Admin role required".into()));
    }
    Ok(())
}

/// Accepted but suspicious: a percentage above 100 produces a discount
/// larger than the subtotal. Surfaced in the log instead of clamped.
fn warn_on_oversized_percentage(coupon: &Coupon) {
    if coupon.discount_type == DiscountType::Percentage && coupon.discount_value > 100.0 {
        tracing::warn!(
            code = %coupon.code,
            discount_value = coupon.discount_value,
            "percentage coupon exceeds 100%; discounts will exceed the subtotal"
        );
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub purchase_amount: f64,
}

/// Dry-run eligibility check. Never consumes a use, so clients can call
/// it while the cart is still changing.
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(input): Json<ValidateCouponRequest>,
) -> Result<Response> {
    if input.purchase_amount < 0.0 {
        return Err(AppError::BadRequest(
            "Purchase amount cannot be negative".into(),
        ));
    }

    let conn = state.db.get()?;
    let validation = coupons::validate_coupon(&conn, &input.code, input.purchase_amount)?;

    if !validation.is_valid {
        let body = json!({
            "valid": false,
            "message": validation.message,
            "discount": 0.0,
        });
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    // The coupon is always present on the valid path.
    let coupon = validation.coupon.as_ref();
    let body = json!({
        "valid": true,
        "message": validation.message,
        "discount": validation.discount,
        "coupon": coupon.map(|c| json!({
            "code": c.code,
            "discount_type": c.discount_type,
            "discount_value": c.discount_value,
        })),
    });
    Ok(Json(body).into_response())
}

pub async fn create_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateCoupon>,
) -> Result<Json<Coupon>> {
    require_admin(&ctx)?;
    input.validate()?;

    let conn = state.db.get()?;
    if queries::get_coupon_by_code(&conn, &input.code)?.is_some() {
        return Err(AppError::BadRequest("Coupon code already exists".into()));
    }

    let coupon = queries::create_coupon(&conn, &input)?;
    warn_on_oversized_percentage(&coupon);
    Ok(Json(coupon))
}

pub async fn list_coupons(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Coupon>>> {
    require_admin(&ctx)?;
    let conn = state.db.get()?;
    Ok(Json(queries::list_coupons(&conn)?))
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Coupon>> {
    require_admin(&ctx)?;
    let conn = state.db.get()?;
    let coupon = queries::get_coupon_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Cupón no encontrado".into()))?;
    Ok(Json(coupon))
}

pub async fn get_coupon_by_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(code): Path<String>,
) -> Result<Json<Coupon>> {
    require_admin(&ctx)?;
    let conn = state.db.get()?;
    let coupon = queries::get_coupon_by_code(&conn, &code)?
        .ok_or_else(|| AppError::NotFound("Cupón no encontrado".into()))?;
    Ok(Json(coupon))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCoupon>,
) -> Result<Json<Coupon>> {
    require_admin(&ctx)?;

    let conn = state.db.get()?;
    queries::get_coupon_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Cupón no encontrado".into()))?;

    if let Some(ref code) = input.code {
        if let Some(existing) = queries::get_coupon_by_code(&conn, code)? {
            if existing.id != id {
                return Err(AppError::BadRequest("Coupon code already exists".into()));
            }
        }
    }

    queries::update_coupon(&conn, &id, &input)?;

    let coupon = queries::get_coupon_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Cupón no encontrado".into()))?;
    warn_on_oversized_percentage(&coupon);
    Ok(Json(coupon))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    require_admin(&ctx)?;
    let conn = state.db.get()?;
    if !queries::delete_coupon(&conn, &id)? {
        return Err(AppError::NotFound("Cupón no encontrado".into()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
