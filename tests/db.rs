//! Query-layer tests: CRUD round-trips, normalized lookups, patch
//! semantics, and the conditional usage increment at the SQL level.

mod common;
use common::*;

use storefront::db::queries;
use storefront::models::{
    CreateRole, DiscountType, UpdateCoupon, UpdateOrder, UpdateProduct, UpdateRole,
};
use storefront::orders::place_order;
use storefront::util::verify_password;

#[test]
fn product_crud_round_trip() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();

    let product = create_test_product(&conn, "Teclado", 89.99);
    let fetched = queries::get_product_by_id(&conn, &product.id).unwrap().unwrap();
    assert_eq!(fetched.name, "Teclado");
    assert_eq!(fetched.price, 89.99);
    assert_eq!(fetched.image_url, None);

    queries::update_product(
        &conn,
        &product.id,
        &UpdateProduct {
            name: None,
            description: None,
            price: Some(79.99),
            stock: None,
            category: None,
            brand: None,
            image_url: Some(Some("https://example.com/kb.png".to_string())),
        },
    )
    .unwrap();
    let updated = queries::get_product_by_id(&conn, &product.id).unwrap().unwrap();
    assert_eq!(updated.price, 79.99);
    assert_eq!(updated.image_url.as_deref(), Some("https://example.com/kb.png"));
    // Untouched fields survive the patch.
    assert_eq!(updated.name, "Teclado");

    // Clearing a nullable field.
    queries::update_product(
        &conn,
        &product.id,
        &UpdateProduct {
            name: None,
            description: None,
            price: None,
            stock: None,
            category: None,
            brand: None,
            image_url: Some(None),
        },
    )
    .unwrap();
    let cleared = queries::get_product_by_id(&conn, &product.id).unwrap().unwrap();
    assert_eq!(cleared.image_url, None);

    assert!(queries::delete_product(&conn, &product.id).unwrap());
    assert!(queries::get_product_by_id(&conn, &product.id).unwrap().is_none());
    assert!(!queries::delete_product(&conn, &product.id).unwrap());
}

#[test]
fn role_crud_and_unique_name() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();

    let role = queries::create_role(&conn, &CreateRole { name: "admin".into() }).unwrap();
    assert!(queries::get_role_by_name(&conn, "admin").unwrap().is_some());

    // UNIQUE constraint surfaces as a database error.
    assert!(queries::create_role(&conn, &CreateRole { name: "admin".into() }).is_err());

    queries::update_role(&conn, &role.id, &UpdateRole { name: Some("staff".into()) }).unwrap();
    assert!(queries::get_role_by_name(&conn, "admin").unwrap().is_none());
    assert_eq!(
        queries::get_role_by_id(&conn, &role.id).unwrap().unwrap().name,
        "staff"
    );

    assert!(queries::delete_role(&conn, &role.id).unwrap());
}

#[test]
fn user_passwords_are_salted_hashes() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();

    let user = create_test_user(&conn, "Ana@Example.COM", "hunter2-hunter2", &["user"]);
    assert_eq!(user.email, "ana@example.com");
    assert_ne!(user.password_hash, "hunter2-hunter2");
    assert!(verify_password(&user.password_salt, "hunter2-hunter2", &user.password_hash));
    assert!(!verify_password(&user.password_salt, "wrong", &user.password_hash));

    // Lookup is case-insensitive via lowercase normalization.
    let fetched = queries::get_user_by_email(&conn, "ANA@example.com").unwrap().unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.roles, vec!["user".to_string()]);
}

#[test]
fn coupon_code_stored_normalized_and_unique() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();

    let coupon = create_test_coupon(&conn, &coupon_input(" promo10 ", DiscountType::Fixed, 10.0));
    assert_eq!(coupon.code, "PROMO10");

    // A differently-cased duplicate hits the UNIQUE index.
    assert!(queries::create_coupon(&conn, &coupon_input("Promo10", DiscountType::Fixed, 10.0)).is_err());
}

#[test]
fn coupon_patch_can_clear_cap_and_expiration() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();
    let mut input = coupon_input("AJUSTABLE", DiscountType::Percentage, 5.0);
    input.max_uses = Some(10);
    input.expiration_date = Some(future_timestamp(5));
    let coupon = create_test_coupon(&conn, &input);

    queries::update_coupon(
        &conn,
        &coupon.id,
        &UpdateCoupon {
            code: None,
            discount_type: Some(DiscountType::Fixed),
            discount_value: Some(15.0),
            min_purchase_amount: None,
            max_uses: Some(None),
            used_count: None,
            expiration_date: Some(None),
            is_active: Some(false),
        },
    )
    .unwrap();

    let updated = queries::get_coupon_by_id(&conn, &coupon.id).unwrap().unwrap();
    assert_eq!(updated.discount_type, DiscountType::Fixed);
    assert_eq!(updated.discount_value, 15.0);
    assert_eq!(updated.max_uses, None);
    assert_eq!(updated.expiration_date, None);
    assert!(!updated.is_active);
}

#[test]
fn conditional_increment_stops_exactly_at_the_cap() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();
    let mut input = coupon_input("TOPE", DiscountType::Fixed, 1.0);
    input.max_uses = Some(2);
    create_test_coupon(&conn, &input);

    assert!(queries::increment_coupon_usage(&conn, "tope").unwrap());
    assert!(queries::increment_coupon_usage(&conn, "TOPE").unwrap());
    assert!(!queries::increment_coupon_usage(&conn, "TOPE").unwrap());
    assert_eq!(used_count(&conn, "TOPE"), 2);
}

#[test]
fn unlimited_coupon_increments_freely() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();
    create_test_coupon(&conn, &coupon_input("LIBRE", DiscountType::Fixed, 1.0));

    for _ in 0..5 {
        assert!(queries::increment_coupon_usage(&conn, "LIBRE").unwrap());
    }
    assert_eq!(used_count(&conn, "LIBRE"), 5);
}

#[test]
fn increment_on_missing_code_matches_nothing() {
    let state = create_test_app_state();
    let conn = state.db.get().unwrap();
    assert!(!queries::increment_coupon_usage(&conn, "NADA").unwrap());
}

#[test]
fn order_round_trip_preserves_items_and_status() {
    let state = create_test_app_state();
    let mut conn = state.db.get().unwrap();

    let mut input = order_input("user-9", 120.0, None);
    input.products.push(storefront::models::OrderItem {
        product_id: "product-2".to_string(),
        quantity: 3,
    });
    let order = place_order(&mut conn, &input).unwrap();

    let fetched = queries::get_order_by_id(&conn, &order.id).unwrap().unwrap();
    assert_eq!(fetched.products.len(), 2);
    assert_eq!(fetched.products[1].quantity, 3);
    assert_eq!(fetched.status, storefront::models::OrderStatus::Pending);
    assert_eq!(fetched.user_id, "user-9");
}

#[test]
fn order_admin_patch_never_touches_coupon_state() {
    let state = create_test_app_state();
    let mut conn = state.db.get().unwrap();
    create_test_coupon(&conn, &coupon_input("SNAP", DiscountType::Fixed, 10.0));
    let order = place_order(&mut conn, &order_input("user-1", 100.0, Some("SNAP"))).unwrap();
    assert_eq!(used_count(&conn, "SNAP"), 1);

    queries::update_order(
        &conn,
        &order.id,
        &UpdateOrder {
            description: Some("corrected".into()),
            discount: None,
            coupon_code: Some(None),
            total_amount: None,
            status: Some(storefront::models::OrderStatus::Cancelled),
        },
    )
    .unwrap();

    let updated = queries::get_order_by_id(&conn, &order.id).unwrap().unwrap();
    assert_eq!(updated.coupon_code, None);
    assert_eq!(updated.status, storefront::models::OrderStatus::Cancelled);
    // Patch is purely administrative; the usage counter is untouched.
    assert_eq!(used_count(&conn, "SNAP"), 1);

    assert!(queries::delete_order(&conn, &order.id).unwrap());
    assert!(queries::get_order_by_id(&conn, &order.id).unwrap().is_none());
}
