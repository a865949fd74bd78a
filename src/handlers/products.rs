//! Product catalog, rating and wishlist handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::domain::aggregates::product::{average_rating, upsert_rating, Rating, RatingOutcome};
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i32,
    pub sold: i32,
    pub total_rating: Decimal,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub category: String,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

pub async fn create_product(
    State(s): State<AppState>,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Product>>)> {
    r.validate()?;
    if r.price <= Decimal::ZERO {
        return Err(ApiError::Validation("Price must be greater than zero...".to_string()));
    }
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, title, slug, description, brand, category, price, quantity, images) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.title)
    .bind(slugify(&r.title))
    .bind(&r.description)
    .bind(&r.brand)
    .bind(&r.category)
    .bind(r.price)
    .bind(r.quantity)
    .bind(&r.images)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("create new product successfully...", product)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

pub async fn list_products(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let category = p.category.unwrap_or_default();
    let search = p.search.map(|t| format!("%{t}%")).unwrap_or_else(|| "%".to_string());
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_active AND ($1 = '' OR category = $1) AND title ILIKE $2 \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(&category)
    .bind(&search)
    .bind(per_page as i64)
    .bind(crate::response::page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products WHERE is_active AND ($1 = '' OR category = $1) AND title ILIKE $2",
    )
    .bind(&category)
    .bind(&search)
    .fetch_one(&s.db)
    .await?;
    Ok(ApiResponse::with_meta(
        "get all products successfully...",
        products,
        Meta::paginated(total, page, per_page),
    ))
}

pub async fn get_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    Ok(ApiResponse::ok("get single product by id successfully...", product))
}

pub async fn get_product_by_slug(
    State(s): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&s.db)
        .await?
        .ok_or(ApiError::ProductNotFound)?;
    Ok(ApiResponse::ok("get single product by slug successfully...", product))
}

pub async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    r.validate()?;
    // the slug is derived once at creation and never rewritten
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET title = $2, description = $3, brand = $4, category = $5, price = $6, \
         quantity = $7, images = $8, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.title)
    .bind(&r.description)
    .bind(&r.brand)
    .bind(&r.category)
    .bind(r.price)
    .bind(r.quantity)
    .bind(&r.images)
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::ProductNotFound)?;
    Ok(ApiResponse::ok("update single product by id successfully...", product))
}

pub async fn delete_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::ProductNotFound);
    }
    Ok(ApiResponse::ok("delete single product by id successfully...", serde_json::json!({})))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RatingRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub star: i16,
    pub review: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    user_id: Uuid,
    star: i16,
    review: Option<String>,
}

pub async fn rate_product(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Json(r): Json<RatingRequest>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    r.validate()?;
    let mut tx = s.db.begin().await?;
    let product_id: Uuid = sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
        .bind(r.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::ProductNotFound)?;

    let rows = sqlx::query_as::<_, RatingRow>(
        "SELECT user_id, star, review FROM ratings WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_all(&mut *tx)
    .await?;
    let mut ratings: Vec<Rating> = rows
        .into_iter()
        .map(|row| Rating { posted_by: row.user_id, star: row.star, review: row.review })
        .collect();
    let outcome = upsert_rating(
        &mut ratings,
        Rating { posted_by: user_id, star: r.star, review: r.review.clone() },
    );

    sqlx::query(
        "INSERT INTO ratings (product_id, user_id, star, review) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (product_id, user_id) DO UPDATE SET star = EXCLUDED.star, \
         review = EXCLUDED.review, updated_at = NOW()",
    )
    .bind(product_id)
    .bind(user_id)
    .bind(r.star)
    .bind(&r.review)
    .execute(&mut *tx)
    .await?;
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET total_rating = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(product_id)
    .bind(average_rating(&ratings))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    let message = match outcome {
        RatingOutcome::Created => "Product rated successfully...",
        RatingOutcome::Updated => "Product rating updated successfully...",
    };
    Ok(ApiResponse::ok(message, product))
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: Uuid,
}

pub async fn toggle_wishlist(
    State(s): State<AppState>,
    Identity(user_id): Identity,
    Json(r): Json<WishlistRequest>,
) -> ApiResult<Json<ApiResponse<Vec<Uuid>>>> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(r.product_id)
        .fetch_one(&s.db)
        .await?;
    if !exists {
        return Err(ApiError::ProductNotFound);
    }
    // the flip depends on prior membership, so read before writing
    let member: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM wishlist_items WHERE user_id = $1 AND product_id = $2)",
    )
    .bind(user_id)
    .bind(r.product_id)
    .fetch_one(&s.db)
    .await?;
    let message = if member {
        sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(r.product_id)
            .execute(&s.db)
            .await?;
        "Product removed from wishlist successfully..."
    } else {
        sqlx::query(
            "INSERT INTO wishlist_items (user_id, product_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(r.product_id)
        .execute(&s.db)
        .await?;
        "Product added to wishlist successfully..."
    };
    let wishlist: Vec<Uuid> = sqlx::query_scalar(
        "SELECT product_id FROM wishlist_items WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(&s.db)
    .await?;
    Ok(ApiResponse::ok(message, wishlist))
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_slugify_strips_punctuation_and_joins() {
        assert_eq!(slugify("Apple iPhone 14 Pro!"), "apple-iphone-14-pro");
        assert_eq!(slugify("  Wireless   Mouse  "), "wireless-mouse");
        assert_eq!(slugify("Déjà Vu"), "dj-vu");
    }
}
