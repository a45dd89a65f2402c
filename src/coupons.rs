//! Coupon eligibility, discount computation, and redemption.
//!
//! Validation is read-only and can be called any number of times without
//! touching coupon state; consuming a use goes through [`redeem_coupon`],
//! which folds the `max_uses` cap check into the same atomic UPDATE.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Coupon, DiscountType};

/// Canonical form of a coupon code: trimmed and uppercased. Applied at
/// every boundary (create, update, lookup, validate, redeem).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Outcome of checking a coupon against a purchase amount.
///
/// Every rejected path except "not found" still carries the coupon so
/// callers can show its metadata alongside the message.
#[derive(Debug, Clone, Serialize)]
pub struct CouponValidation {
    pub is_valid: bool,
    pub coupon: Option<Coupon>,
    pub message: String,
    pub discount: f64,
}

impl CouponValidation {
    fn rejected(coupon: Option<Coupon>, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            coupon,
            message: message.into(),
            discount: 0.0,
        }
    }
}

/// Decide whether `code` can be applied to a purchase of `purchase_amount`.
///
/// Rules run in a fixed order and the first failure wins, so a coupon
/// that is simultaneously inactive and expired always reports the
/// inactive message. No state is mutated here.
pub fn validate_coupon(
    conn: &Connection,
    code: &str,
    purchase_amount: f64,
) -> Result<CouponValidation> {
    let Some(coupon) = queries::get_coupon_by_code(conn, code)? else {
        return Ok(CouponValidation::rejected(None, "Cupón no encontrado"));
    };

    if !coupon.is_active {
        return Ok(CouponValidation::rejected(
            Some(coupon),
            "El cupón no está activo",
        ));
    }

    if let Some(expiration) = coupon.expiration_date {
        if expiration < chrono::Utc::now().timestamp() {
            return Ok(CouponValidation::rejected(
                Some(coupon),
                "El cupón ha expirado",
            ));
        }
    }

    if let Some(max_uses) = coupon.max_uses {
        if coupon.used_count >= max_uses {
            return Ok(CouponValidation::rejected(
                Some(coupon),
                "El cupón ha alcanzado su límite de usos",
            ));
        }
    }

    if purchase_amount < coupon.min_purchase_amount {
        let message = format!(
            "El monto mínimo de compra es ${}",
            coupon.min_purchase_amount
        );
        return Ok(CouponValidation::rejected(Some(coupon), message));
    }

    let discount = calculate_discount(&coupon, purchase_amount);
    Ok(CouponValidation {
        is_valid: true,
        coupon: Some(coupon),
        message: "Cupón válido".to_string(),
        discount,
    })
}

/// Discount amount for a coupon applied to `subtotal`.
///
/// Fixed discounts are capped at the subtotal so totals never go
/// negative. Percentage values above 100 are not clamped; they are
/// flagged at coupon creation instead.
pub fn calculate_discount(coupon: &Coupon, subtotal: f64) -> f64 {
    match coupon.discount_type {
        DiscountType::Percentage => subtotal * coupon.discount_value / 100.0,
        DiscountType::Fixed => coupon.discount_value.min(subtotal),
    }
}

/// Result of attempting to consume one use of a coupon.
#[derive(Debug)]
pub enum CouponRedemption {
    /// A use was consumed; carries the coupon after the increment.
    Applied(Coupon),
    /// The coupon exists but `used_count` already reached `max_uses`.
    LimitReached(Coupon),
    /// No coupon with this code exists anymore.
    NotFound,
}

/// Consume one use of `code`.
///
/// The increment and the cap check are a single conditional UPDATE, so
/// concurrent redemptions cannot push `used_count` past `max_uses`; the
/// loser lands in `LimitReached` instead.
pub fn redeem_coupon(conn: &Connection, code: &str) -> Result<CouponRedemption> {
    let code = normalize_code(code);

    if queries::increment_coupon_usage(conn, &code)? {
        let coupon = queries::get_coupon_by_code(conn, &code)?
            .ok_or_else(|| crate::error::AppError::Internal("coupon vanished mid-redeem".into()))?;
        tracing::info!(
            code = %coupon.code,
            used_count = coupon.used_count,
            "coupon redeemed"
        );
        return Ok(CouponRedemption::Applied(coupon));
    }

    match queries::get_coupon_by_code(conn, &code)? {
        Some(coupon) => Ok(CouponRedemption::LimitReached(coupon)),
        None => Ok(CouponRedemption::NotFound),
    }
}
