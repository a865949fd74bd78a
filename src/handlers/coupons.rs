//! Coupon administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount: Decimal,
    pub is_active: bool,
    pub expiry: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCouponRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub discount: Decimal,
    pub expiry: Option<DateTime<Utc>>,
}

pub async fn create_coupon(
    State(s): State<AppState>,
    _caller: Identity,
    Json(r): Json<CreateCouponRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Coupon>>)> {
    r.validate()?;
    if r.discount <= Decimal::ZERO || r.discount > Decimal::from(100u32) {
        return Err(ApiError::Validation("Discount must be between 0 and 100...".to_string()));
    }
    let expiry = r.expiry.unwrap_or_else(|| Utc::now() + Duration::days(7));
    let coupon = sqlx::query_as::<_, Coupon>(
        "INSERT INTO coupons (id, code, discount, expiry) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(r.code.trim().to_uppercase())
    .bind(r.discount)
    .bind(expiry)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("create new coupon successfully...", coupon)))
}

pub async fn list_coupons(
    State(s): State<AppState>,
    _caller: Identity,
) -> ApiResult<Json<ApiResponse<Vec<Coupon>>>> {
    let coupons = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
        .fetch_all(&s.db)
        .await?;
    let total = coupons.len() as i64;
    Ok(ApiResponse::with_meta("get all coupons successfully...", coupons, Meta::total(total)))
}

pub async fn toggle_coupon(
    State(s): State<AppState>,
    _caller: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Coupon>>> {
    let coupon = sqlx::query_as::<_, Coupon>(
        "UPDATE coupons SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::CouponNotFound)?;
    Ok(ApiResponse::ok("active and inactive coupon successfully...", coupon))
}

pub async fn delete_coupon(
    State(s): State<AppState>,
    _caller: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let deleted = sqlx::query("DELETE FROM coupons WHERE id = $1").bind(id).execute(&s.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::CouponNotFound);
    }
    Ok(ApiResponse::ok("delete coupon successfully...", serde_json::json!({})))
}
