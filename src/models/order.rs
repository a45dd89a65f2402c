use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// External reference in `ORD-<millis>-<nnn>` form, generated at creation.
    pub order_id: String,
    pub user_id: String,
    pub products: Vec<OrderItem>,
    pub description: String,
    /// Amount subtracted from the subtotal; 0 when no coupon was applied.
    pub discount: f64,
    /// Normalized code of the applied coupon, snapshotted at creation.
    /// Deleting the coupon later does not affect past orders.
    pub coupon_code: Option<String>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub user_id: String,
    pub products: Vec<OrderItem>,
    #[serde(default)]
    pub description: String,
    pub subtotal: f64,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl CreateOrder {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::BadRequest("User id is required".into()));
        }
        if self.products.is_empty() {
            return Err(AppError::BadRequest(
                "At least one product is required".into(),
            ));
        }
        if self.products.iter().any(|item| item.quantity < 1) {
            return Err(AppError::BadRequest(
                "Product quantity must be at least 1".into(),
            ));
        }
        if self.subtotal < 0.0 {
            return Err(AppError::BadRequest("Subtotal cannot be negative".into()));
        }
        Ok(())
    }
}

/// Administrative patch for manual correction. Never replays coupon
/// validation or adjusts a coupon's usage counter.
#[derive(Debug, Deserialize)]
pub struct UpdateOrder {
    pub description: Option<String>,
    pub discount: Option<f64>,
    pub coupon_code: Option<Option<String>>,
    pub total_amount: Option<f64>,
    pub status: Option<OrderStatus>,
}
