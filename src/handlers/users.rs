//! Minimal user handlers. Credential flows stay in the external auth
//! service; this service only needs user rows to own carts, orders and
//! wishlists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

use super::products::Product;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub mobile: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub firstname: String,
    #[validate(length(min = 1))]
    pub lastname: String,
    pub mobile: Option<String>,
}

pub async fn create_user(
    State(s): State<AppState>,
    Json(r): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    r.validate()?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&r.email)
        .fetch_one(&s.db)
        .await?;
    if exists {
        return Err(ApiError::UserAlreadyExists);
    }
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, firstname, lastname, mobile) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.email)
    .bind(&r.firstname)
    .bind(&r.lastname)
    .bind(&r.mobile)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("User created successfully...", user)))
}

pub async fn get_user(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(ApiResponse::ok("Get single user successfully...", user))
}

pub async fn get_wishlist(
    State(s): State<AppState>,
    Identity(user_id): Identity,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM wishlist_items w JOIN products p ON p.id = w.product_id \
         WHERE w.user_id = $1 ORDER BY w.created_at",
    )
    .bind(user_id)
    .fetch_all(&s.db)
    .await?;
    let total = products.len() as i64;
    Ok(ApiResponse::with_meta("Get user wishlist successfully...", products, Meta::total(total)))
}
