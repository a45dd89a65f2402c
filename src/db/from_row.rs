//! Row-mapping helpers shared by the query layer.
//!
//! Each entity lists its column order once (`*_COLS`) and implements
//! [`FromRow`] against that order; query functions interpolate the constant
//! into their SELECTs so the two can never drift independently.

use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql};

use crate::error::Result;
use crate::models::{Coupon, Order, Product, Role, User};

pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query_map(params, |row| T::from_row(row))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub const USER_COLS: &str = "id, name, email, password_hash, password_salt, roles, created_at";

impl FromRow for User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let roles_json: String = row.get(5)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            password_salt: row.get(4)?,
            roles: serde_json::from_str(&roles_json).unwrap_or_default(),
            created_at: row.get(6)?,
        })
    }
}

pub const ROLE_COLS: &str = "id, name, created_at";

impl FromRow for Role {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Role {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

pub const PRODUCT_COLS: &str =
    "id, name, description, price, stock, category, brand, image_url, created_at";

impl FromRow for Product {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            stock: row.get(4)?,
            category: row.get(5)?,
            brand: row.get(6)?,
            image_url: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

pub const COUPON_COLS: &str = "id, code, discount_type, discount_value, min_purchase_amount, \
     max_uses, used_count, expiration_date, is_active, created_at";

impl FromRow for Coupon {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Coupon {
            id: row.get(0)?,
            code: row.get(1)?,
            discount_type: row
                .get::<_, String>(2)?
                .parse()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
            discount_value: row.get(3)?,
            min_purchase_amount: row.get(4)?,
            max_uses: row.get(5)?,
            used_count: row.get(6)?,
            expiration_date: row.get(7)?,
            is_active: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

pub const ORDER_COLS: &str = "id, order_id, user_id, products, description, discount, \
     coupon_code, total_amount, status, created_at";

impl FromRow for Order {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let products_json: String = row.get(3)?;
        Ok(Order {
            id: row.get(0)?,
            order_id: row.get(1)?,
            user_id: row.get(2)?,
            products: serde_json::from_str(&products_json).unwrap_or_default(),
            description: row.get(4)?,
            discount: row.get(5)?,
            coupon_code: row.get(6)?,
            total_amount: row.get(7)?,
            status: row
                .get::<_, String>(8)?
                .parse()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
            created_at: row.get(9)?,
        })
    }
}
