use chrono::Utc;
use rusqlite::{Connection, params, types::Value};
use uuid::Uuid;

use crate::coupons::normalize_code;
use crate::error::Result;
use crate::models::*;
use crate::util::{generate_salt, hash_password};

use super::from_row::{
    COUPON_COLS, ORDER_COLS, PRODUCT_COLS, ROLE_COLS, USER_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query for efficiency.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a column to an explicit value (including NULL).
    /// Use this for Option<T> where Some(v) = set to v, None = set to NULL.
    fn set_nullable<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.fields.push((column, v.into())),
            None => self.fields.push((column, Value::Null)),
        }
        self
    }

    fn execute(self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }
}

// ============ Users ============

/// Create a user. Email is stored lowercase; the password is salted and
/// hashed before it touches the database.
pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    let id = gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();
    let salt = generate_salt();
    let hash = hash_password(&salt, &input.password);
    let roles_json = serde_json::to_string(&input.roles)?;

    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, password_salt, roles, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![&id, &input.name, &email, &hash, &salt, &roles_json, now],
    )?;

    Ok(User {
        id,
        name: input.name.clone(),
        email,
        password_hash: hash,
        password_salt: salt,
        roles: input.roles.clone(),
        created_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLS),
        &[],
    )
}

pub fn delete_user(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Roles ============

pub fn create_role(conn: &Connection, input: &CreateRole) -> Result<Role> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO roles (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![&id, &input.name, now],
    )?;

    Ok(Role {
        id,
        name: input.name.clone(),
        created_at: now,
    })
}

pub fn get_role_by_id(conn: &Connection, id: &str) -> Result<Option<Role>> {
    query_one(
        conn,
        &format!("SELECT {} FROM roles WHERE id = ?1", ROLE_COLS),
        &[&id],
    )
}

pub fn get_role_by_name(conn: &Connection, name: &str) -> Result<Option<Role>> {
    query_one(
        conn,
        &format!("SELECT {} FROM roles WHERE name = ?1", ROLE_COLS),
        &[&name],
    )
}

pub fn list_roles(conn: &Connection) -> Result<Vec<Role>> {
    query_all(
        conn,
        &format!("SELECT {} FROM roles ORDER BY created_at DESC", ROLE_COLS),
        &[],
    )
}

pub fn update_role(conn: &Connection, id: &str, input: &UpdateRole) -> Result<bool> {
    UpdateBuilder::new("roles", id)
        .set_opt("name", input.name.clone())
        .execute(conn)
}

pub fn delete_role(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM roles WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Products ============

pub fn create_product(conn: &Connection, input: &CreateProduct) -> Result<Product> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO products (id, name, description, price, stock, category, brand, image_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &id,
            &input.name,
            &input.description,
            input.price,
            input.stock,
            &input.category,
            &input.brand,
            &input.image_url,
            now
        ],
    )?;

    Ok(Product {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        price: input.price,
        stock: input.stock,
        category: input.category.clone(),
        brand: input.brand.clone(),
        image_url: input.image_url.clone(),
        created_at: now,
    })
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        &[&id],
    )
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            PRODUCT_COLS
        ),
        &[],
    )
}

pub fn update_product(conn: &Connection, id: &str, input: &UpdateProduct) -> Result<bool> {
    let mut builder = UpdateBuilder::new("products", id)
        .set_opt("name", input.name.clone())
        .set_opt("description", input.description.clone())
        .set_opt("price", input.price)
        .set_opt("stock", input.stock)
        .set_opt("category", input.category.clone())
        .set_opt("brand", input.brand.clone());

    // image_url: Some(None) clears the value
    if let Some(ref image_url) = input.image_url {
        builder = builder.set_nullable("image_url", image_url.clone());
    }

    builder.execute(conn)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Coupons ============

/// Create a coupon. The code is stored normalized so lookups and
/// redemptions hit the UNIQUE index regardless of input casing.
pub fn create_coupon(conn: &Connection, input: &CreateCoupon) -> Result<Coupon> {
    let id = gen_id();
    let now = now();
    let code = normalize_code(&input.code);

    conn.execute(
        "INSERT INTO coupons (id, code, discount_type, discount_value, min_purchase_amount,
                              max_uses, used_count, expiration_date, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9)",
        params![
            &id,
            &code,
            input.discount_type.as_ref(),
            input.discount_value,
            input.min_purchase_amount,
            input.max_uses,
            input.expiration_date,
            input.is_active,
            now
        ],
    )?;

    Ok(Coupon {
        id,
        code,
        discount_type: input.discount_type,
        discount_value: input.discount_value,
        min_purchase_amount: input.min_purchase_amount,
        max_uses: input.max_uses,
        used_count: 0,
        expiration_date: input.expiration_date,
        is_active: input.is_active,
        created_at: now,
    })
}

pub fn get_coupon_by_id(conn: &Connection, id: &str) -> Result<Option<Coupon>> {
    query_one(
        conn,
        &format!("SELECT {} FROM coupons WHERE id = ?1", COUPON_COLS),
        &[&id],
    )
}

/// Case-insensitive lookup: the caller's code is normalized before the
/// equality match against the normalized stored code.
pub fn get_coupon_by_code(conn: &Connection, code: &str) -> Result<Option<Coupon>> {
    let code = normalize_code(code);
    query_one(
        conn,
        &format!("SELECT {} FROM coupons WHERE code = ?1", COUPON_COLS),
        &[&code],
    )
}

pub fn list_coupons(conn: &Connection) -> Result<Vec<Coupon>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC",
            COUPON_COLS
        ),
        &[],
    )
}

pub fn update_coupon(conn: &Connection, id: &str, input: &UpdateCoupon) -> Result<bool> {
    let mut builder = UpdateBuilder::new("coupons", id)
        .set_opt("code", input.code.as_deref().map(normalize_code))
        .set_opt(
            "discount_type",
            input.discount_type.map(|t| t.as_ref().to_string()),
        )
        .set_opt("discount_value", input.discount_value)
        .set_opt("min_purchase_amount", input.min_purchase_amount)
        .set_opt("used_count", input.used_count)
        .set_opt("is_active", input.is_active.map(|b| b as i64));

    // max_uses / expiration_date: Some(None) clears (unlimited / never expires)
    if let Some(max_uses) = input.max_uses {
        builder = builder.set_nullable("max_uses", max_uses);
    }
    if let Some(expiration_date) = input.expiration_date {
        builder = builder.set_nullable("expiration_date", expiration_date);
    }

    builder.execute(conn)
}

pub fn delete_coupon(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM coupons WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Consume one use of a coupon in a single conditional UPDATE.
///
/// The cap check lives inside the statement itself, so `used_count` can
/// never pass `max_uses` even when two redemptions race: the losing
/// UPDATE matches zero rows and returns false.
pub fn increment_coupon_usage(conn: &Connection, code: &str) -> Result<bool> {
    let code = normalize_code(code);
    let affected = conn.execute(
        "UPDATE coupons SET used_count = used_count + 1
         WHERE code = ?1 AND (max_uses IS NULL OR used_count < max_uses)",
        params![&code],
    )?;
    Ok(affected > 0)
}

// ============ Orders ============

/// Insert an order row with its derived fields already computed by the
/// placement flow (`orders::place_order`).
pub fn create_order(
    conn: &Connection,
    input: &CreateOrder,
    order_ref: &str,
    discount: f64,
    coupon_code: Option<&str>,
    total_amount: f64,
) -> Result<Order> {
    let id = gen_id();
    let now = now();
    let status = input.status.unwrap_or(OrderStatus::Pending);
    let products_json = serde_json::to_string(&input.products)?;

    conn.execute(
        "INSERT INTO orders (id, order_id, user_id, products, description, discount,
                             coupon_code, total_amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &id,
            order_ref,
            &input.user_id,
            &products_json,
            &input.description,
            discount,
            coupon_code,
            total_amount,
            status.as_ref(),
            now
        ],
    )?;

    Ok(Order {
        id,
        order_id: order_ref.to_string(),
        user_id: input.user_id.clone(),
        products: input.products.clone(),
        description: input.description.clone(),
        discount,
        coupon_code: coupon_code.map(String::from),
        total_amount,
        status,
        created_at: now,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

pub fn list_orders(conn: &Connection) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLS),
        &[],
    )
}

/// Administrative patch for manual correction. Never replays coupon
/// validation or touches a coupon's usage counter.
pub fn update_order(conn: &Connection, id: &str, input: &UpdateOrder) -> Result<bool> {
    let mut builder = UpdateBuilder::new("orders", id)
        .set_opt("description", input.description.clone())
        .set_opt("discount", input.discount)
        .set_opt("total_amount", input.total_amount)
        .set_opt("status", input.status.map(|s| s.as_ref().to_string()));

    // coupon_code: Some(None) clears the snapshot
    if let Some(ref coupon_code) = input.coupon_code {
        builder = builder.set_nullable("coupon_code", coupon_code.as_deref().map(normalize_code));
    }

    builder.execute(conn)
}

pub fn delete_order(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM orders WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}
