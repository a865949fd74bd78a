//! Cart aggregation and coupon application handlers.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::aggregates::coupon::{CouponRejection, CouponTerms};
use crate::domain::value_objects::{Money, DEFAULT_CURRENCY};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    cart_total: Decimal,
    total_after_discount: Option<Decimal>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: Uuid,
    pub ordered_by: Uuid,
    pub products: Vec<CartLineView>,
    pub cart_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_after_discount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: Decimal,
}

impl CartView {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            id: cart.id(),
            ordered_by: cart.user_id(),
            products: cart
                .lines()
                .iter()
                .map(|l| CartLineView {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.unit_price.amount(),
                })
                .collect(),
            cart_total: cart.total().amount(),
            total_after_discount: cart.total_after_discount().map(|m| m.amount()),
        }
    }
}

/// Loads the user's cart inside `tx` with the cart row locked, so
/// concurrent mutations of the same cart serialize.
pub(crate) async fn load_cart(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
) -> ApiResult<Option<Cart>> {
    let row = sqlx::query_as::<_, CartRow>(
        "SELECT id, user_id, cart_total, total_after_discount FROM carts WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    let Some(row) = row else { return Ok(None) };
    let items = sqlx::query_as::<_, CartItemRow>(
        "SELECT product_id, quantity, unit_price FROM cart_items WHERE cart_id = $1 ORDER BY product_id",
    )
    .bind(row.id)
    .fetch_all(&mut **tx)
    .await?;
    let lines = items
        .into_iter()
        .map(|i| CartLine {
            product_id: i.product_id,
            quantity: i.quantity as u32,
            unit_price: Money::new(i.unit_price, DEFAULT_CURRENCY),
        })
        .collect();
    Ok(Some(Cart::from_parts(
        row.id,
        row.user_id,
        DEFAULT_CURRENCY,
        lines,
        row.total_after_discount.map(|d| Money::new(d, DEFAULT_CURRENCY)),
    )))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub count: u32,
}

pub async fn add_to_cart(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Json(r): Json<AddToCartRequest>,
) -> ApiResult<Json<ApiResponse<CartView>>> {
    r.validate()?;
    let price: Decimal = sqlx::query_scalar("SELECT price FROM products WHERE id = $1 AND is_active")
        .bind(r.product_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(ApiError::ProductNotFound)?;

    let mut tx = s.db.begin().await?;
    let existing = load_cart(&mut tx, user_id).await?;
    let is_new = existing.is_none();
    let mut cart = existing.unwrap_or_else(|| Cart::new(user_id, DEFAULT_CURRENCY));
    let line_price = cart
        .set_line(r.product_id, r.count, Money::new(price, DEFAULT_CURRENCY))
        .unit_price
        .amount();

    if is_new {
        sqlx::query("INSERT INTO carts (id, user_id, cart_total) VALUES ($1, $2, $3)")
            .bind(cart.id())
            .bind(user_id)
            .bind(cart.total().amount())
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "UPDATE carts SET cart_total = $2, total_after_discount = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(cart.id())
        .bind(cart.total().amount())
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query(
        "INSERT INTO cart_items (cart_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity",
    )
    .bind(cart.id())
    .bind(r.product_id)
    .bind(r.count as i32)
    .bind(line_price)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(ApiResponse::ok("Product added to cart successfully...", CartView::from_cart(&cart)))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PopulatedLine {
    pub product_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PopulatedCart {
    pub id: Uuid,
    pub ordered_by: Uuid,
    pub products: Vec<PopulatedLine>,
    pub cart_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_after_discount: Option<Decimal>,
}

pub async fn get_cart(
    State(s): State<AppState>,
    Identity(user_id): Identity,
) -> ApiResult<Json<ApiResponse<PopulatedCart>>> {
    let row = sqlx::query_as::<_, CartRow>(
        "SELECT id, user_id, cart_total, total_after_discount FROM carts WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::CartNotFound)?;
    let products = sqlx::query_as::<_, PopulatedLine>(
        "SELECT ci.product_id, p.title, ci.quantity, ci.unit_price \
         FROM cart_items ci JOIN products p ON p.id = ci.product_id \
         WHERE ci.cart_id = $1 ORDER BY p.title",
    )
    .bind(row.id)
    .fetch_all(&s.db)
    .await?;
    Ok(ApiResponse::ok(
        "Get user cart successfully...",
        PopulatedCart {
            id: row.id,
            ordered_by: row.user_id,
            products,
            cart_total: row.cart_total,
            total_after_discount: row.total_after_discount,
        },
    ))
}

pub async fn empty_cart(
    State(s): State<AppState>,
    Identity(user_id): Identity,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    sqlx::query("DELETE FROM carts WHERE user_id = $1")
        .bind(user_id)
        .execute(&s.db)
        .await?;
    Ok(ApiResponse::ok("User cart emptied successfully...", serde_json::json!({})))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyCouponRequest {
    #[validate(length(min = 1))]
    pub coupon: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    discount: Decimal,
    is_active: bool,
    expiry: DateTime<Utc>,
}

pub async fn apply_coupon(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Json(r): Json<ApplyCouponRequest>,
) -> ApiResult<Json<ApiResponse<CartView>>> {
    r.validate()?;
    let code = r.coupon.trim().to_uppercase();
    let coupon = sqlx::query_as::<_, CouponRow>(
        "SELECT discount, is_active, expiry FROM coupons WHERE code = $1",
    )
    .bind(&code)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::InvalidCoupon)?;
    let terms = CouponTerms {
        discount: coupon.discount,
        is_active: coupon.is_active,
        expiry: coupon.expiry,
    };
    terms.redeemable(Utc::now(), s.enforce_coupon_expiry).map_err(|r| match r {
        CouponRejection::Inactive => ApiError::InvalidCoupon,
        CouponRejection::Expired => ApiError::CouponExpired,
    })?;

    let mut tx = s.db.begin().await?;
    let mut cart = load_cart(&mut tx, user_id).await?.ok_or(ApiError::CartNotFound)?;
    cart.apply_discount(terms.discount);
    sqlx::query("UPDATE carts SET total_after_discount = $2, updated_at = NOW() WHERE id = $1")
        .bind(cart.id())
        .bind(cart.total_after_discount().map(|m| m.amount()))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(ApiResponse::ok("Coupon applied to user cart successfully...", CartView::from_cart(&cart)))
}
