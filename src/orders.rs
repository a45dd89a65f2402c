//! Order placement: coupon validation, discount, persistence, and the
//! usage increment, all inside one SQLite transaction.
//!
//! Everything commits or rolls back together, so a failed order insert
//! can never consume a coupon use and a raced-out usage cap aborts the
//! order instead of overshooting `max_uses`.

use rusqlite::Connection;

use crate::coupons::{self, CouponRedemption};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{CreateOrder, Order};
use crate::util::generate_order_ref;

pub fn place_order(conn: &mut Connection, input: &CreateOrder) -> Result<Order> {
    input.validate()?;

    let tx = conn.transaction()?;

    // An invalid coupon is a hard abort: no order row, no usage consumed.
    let (discount, coupon_code) = match input.coupon_code.as_deref() {
        Some(code) if !code.trim().is_empty() => {
            let validation = coupons::validate_coupon(&tx, code, input.subtotal)?;
            if !validation.is_valid {
                return Err(AppError::BadRequest(validation.message));
            }
            (validation.discount, Some(coupons::normalize_code(code)))
        }
        _ => (0.0, None),
    };

    let total_amount = input.subtotal - discount;
    let order_ref = generate_order_ref();
    let order = queries::create_order(
        &tx,
        input,
        &order_ref,
        discount,
        coupon_code.as_deref(),
        total_amount,
    )?;

    if let Some(code) = &coupon_code {
        match coupons::redeem_coupon(&tx, code)? {
            CouponRedemption::Applied(_) => {}
            CouponRedemption::LimitReached(_) => {
                // Validation passed on a stale read; dropping the
                // transaction rolls the order insert back.
                return Err(AppError::BadRequest(
                    "El cupón ha alcanzado su límite de usos".into(),
                ));
            }
            CouponRedemption::NotFound => {
                return Err(AppError::BadRequest("Cupón no encontrado".into()));
            }
        }
    }

    tx.commit()?;

    tracing::info!(
        order_id = %order.order_id,
        user_id = %order.user_id,
        discount = order.discount,
        total_amount = order.total_amount,
        coupon = order.coupon_code.as_deref().unwrap_or("-"),
        "order placed"
    );

    Ok(order)
}
