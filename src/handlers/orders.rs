//! Order commit and retrieval handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::domain::aggregates::order::{Order, PaymentMethod};
use crate::domain::events::{self, DomainEvent};
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

use super::cart::load_cart;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub order_total: Decimal,
    pub total_after_discount: Option<Decimal>,
    pub coupon_applied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderRow,
    pub products: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub coupon_applied: bool,
}

/// Materializes the caller's cart into an order. Order insert, per-line
/// conditional inventory decrement and cart deletion happen in one
/// transaction: a line that cannot be satisfied rolls everything back.
pub async fn place_order(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Json(r): Json<PlaceOrderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrderView>>)> {
    let method = r
        .payment_method
        .ok_or_else(|| ApiError::Validation("Payment method is required...".to_string()))?;

    let mut tx = s.db.begin().await?;
    let cart = load_cart(&mut tx, user_id).await?.ok_or(ApiError::CartNotFound)?;
    let order = Order::from_cart(&cart, method, r.coupon_applied).map_err(|_| ApiError::CartNotFound)?;

    let order_row = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (id, user_id, payment_id, amount, currency, payment_method, \
         payment_status, order_status, order_total, total_after_discount, coupon_applied) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(order.id())
    .bind(user_id)
    .bind(&order.payment().id)
    .bind(order.payment().amount.amount())
    .bind(order.payment().amount.currency())
    .bind(order.payment().method.as_str())
    .bind(order.payment().status.as_str())
    .bind(order.status().as_str())
    .bind(order.order_total().amount())
    .bind(order.total_after_discount().map(|m| m.amount()))
    .bind(order.coupon_applied())
    .fetch_one(&mut *tx)
    .await?;

    for line in order.lines() {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)",
        )
        .bind(order.id())
        .bind(line.product_id)
        .bind(line.quantity as i32)
        .bind(line.unit_price.amount())
        .execute(&mut *tx)
        .await?;
        // decrement-if-sufficient; zero rows means the stock ran out
        let updated = sqlx::query(
            "UPDATE products SET quantity = quantity - $2, sold = sold + $2, updated_at = NOW() \
             WHERE id = $1 AND quantity >= $2",
        )
        .bind(line.product_id)
        .bind(line.quantity as i32)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ApiError::InsufficientStock { product_id: line.product_id });
        }
    }

    sqlx::query("DELETE FROM carts WHERE id = $1")
        .bind(cart.id())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Some(nats) = s.nats.clone() {
        let event = DomainEvent::OrderPlaced {
            order_id: order.id(),
            user_id,
            amount: order.payment().amount.amount(),
            currency: order.payment().amount.currency().to_string(),
        };
        tokio::spawn(async move { events::publish(&nats, &event).await });
    }

    let products = order
        .lines()
        .iter()
        .map(|l| OrderItem {
            product_id: l.product_id,
            quantity: l.quantity as i32,
            unit_price: l.unit_price.amount(),
        })
        .collect();
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Order placed successfully...", OrderView { order: order_row, products }),
    ))
}

async fn attach_items(db: &sqlx::PgPool, rows: Vec<OrderRow>) -> ApiResult<Vec<OrderView>> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let products = sqlx::query_as::<_, OrderItem>(
            "SELECT product_id, quantity, unit_price FROM order_items WHERE order_id = $1",
        )
        .bind(row.id)
        .fetch_all(db)
        .await?;
        orders.push(OrderView { order: row, products });
    }
    Ok(orders)
}

pub async fn get_user_orders(
    State(s): State<AppState>,
    Identity(user_id): Identity,
) -> ApiResult<Json<ApiResponse<Vec<OrderView>>>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&s.db)
    .await?;
    let orders = attach_items(&s.db, rows).await?;
    let total = orders.len() as i64;
    Ok(ApiResponse::with_meta("Get user orders successfully...", orders, Meta::total(total)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_all_orders(
    State(s): State<AppState>,
    _caller: Identity,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<ApiResponse<Vec<OrderView>>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(crate::response::page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&s.db).await?;
    let orders = attach_items(&s.db, rows).await?;
    Ok(ApiResponse::with_meta(
        "get all orders successfully...",
        orders,
        Meta::paginated(total, page, per_page),
    ))
}

pub async fn get_order(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<OrderView>>> {
    let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(ApiError::OrderNotFound)?;
    let products = sqlx::query_as::<_, OrderItem>(
        "SELECT product_id, quantity, unit_price FROM order_items WHERE order_id = $1",
    )
    .bind(row.id)
    .fetch_all(&s.db)
    .await?;
    Ok(ApiResponse::ok("Get order successfully...", OrderView { order: row, products }))
}
