use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    /// Stored normalized (trimmed, uppercase); the lookup key for
    /// validation and redemption.
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_purchase_amount: f64,
    /// None means unlimited uses.
    pub max_uses: Option<i64>,
    pub used_count: i64,
    /// None means never expires.
    pub expiration_date: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub min_purchase_amount: f64,
    #[serde(default)]
    pub max_uses: Option<i64>,
    #[serde(default)]
    pub expiration_date: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateCoupon {
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(AppError::BadRequest("Code is required".into()));
        }
        if self.discount_value < 0.0 {
            return Err(AppError::BadRequest(
                "Discount value cannot be negative".into(),
            ));
        }
        if self.min_purchase_amount < 0.0 {
            return Err(AppError::BadRequest(
                "Minimum purchase amount cannot be negative".into(),
            ));
        }
        if let Some(max_uses) = self.max_uses {
            if max_uses <= 0 {
                return Err(AppError::BadRequest("Max uses must be positive".into()));
            }
        }
        Ok(())
    }
}

/// Administrative patch. `max_uses` and `expiration_date` use the
/// Option<Option<T>> pattern: None = leave unchanged, Some(None) = clear,
/// Some(Some(v)) = set.
#[derive(Debug, Deserialize)]
pub struct UpdateCoupon {
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub min_purchase_amount: Option<f64>,
    pub max_uses: Option<Option<i64>>,
    pub used_count: Option<i64>,
    pub expiration_date: Option<Option<i64>>,
    pub is_active: Option<bool>,
}
