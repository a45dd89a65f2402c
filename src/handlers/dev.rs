//! Dev-mode seeding. Mounted only when STOREFRONT_ENV=dev; also backs
//! the `storefront seed` CLI subcommand.

use axum::extract::State;
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{CreateCoupon, CreateProduct, CreateRole, DiscountType};

/// Insert the demo catalog, roles, and coupons. Safe to run repeatedly:
/// anything that already exists is skipped.
pub fn seed_demo_data(conn: &Connection) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for role in ["admin", "user"] {
        if queries::get_role_by_name(conn, role)?.is_none() {
            queries::create_role(
                conn,
                &CreateRole {
                    name: role.to_string(),
                },
            )?;
            created.push(format!("role {}", role));
        }
    }

    let products = [
        ("Teclado mecánico", 89.99, 40, "peripherals", "Keychron"),
        ("Mouse inalámbrico", 39.99, 120, "peripherals", "Logitech"),
        ("Monitor 27\"", 329.0, 15, "displays", "Dell"),
    ];
    for (name, price, stock, category, brand) in products {
        let exists = queries::list_products(conn)?.iter().any(|p| p.name == name);
        if !exists {
            queries::create_product(
                conn,
                &CreateProduct {
                    name: name.to_string(),
                    description: String::new(),
                    price,
                    stock,
                    category: category.to_string(),
                    brand: brand.to_string(),
                    image_url: None,
                },
            )?;
            created.push(format!("product {}", name));
        }
    }

    let week_from_now = Utc::now().timestamp() + 7 * 86400;
    let coupons = [
        CreateCoupon {
            code: "DESCUENTO20".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 20.0,
            min_purchase_amount: 0.0,
            max_uses: None,
            expiration_date: None,
            is_active: true,
        },
        CreateCoupon {
            code: "BIENVENIDA".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: 50.0,
            min_purchase_amount: 200.0,
            max_uses: None,
            expiration_date: None,
            is_active: true,
        },
        CreateCoupon {
            code: "FLASH10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            min_purchase_amount: 0.0,
            max_uses: Some(100),
            expiration_date: Some(week_from_now),
            is_active: true,
        },
    ];
    for input in coupons {
        if queries::get_coupon_by_code(conn, &input.code)?.is_none() {
            let coupon = queries::create_coupon(conn, &input)?;
            created.push(format!("coupon {}", coupon.code));
        }
    }

    Ok(created)
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub created: Vec<String>,
}

pub async fn seed(State(state): State<AppState>) -> Result<Json<SeedResponse>> {
    let conn = state.db.get()?;
    let created = seed_demo_data(&conn)?;
    tracing::info!("DEV: seeded {} entities", created.len());
    Ok(Json(SeedResponse { created }))
}
