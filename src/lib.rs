//! NextStore Storefront Service
//!
//! Self-hosted e-commerce backend: product catalog, per-user carts,
//! coupon discounts, atomic order commit with inventory adjustment,
//! product ratings, and wishlist/blog engagement.
//!
//! ## Features
//! - Cart aggregation with set-quantity line semantics
//! - Percentage coupons with configurable expiry enforcement
//! - All-or-nothing order commit (decrement-if-sufficient inventory)
//! - Rating upsert per (product, user) with recomputed averages
//! - Mutually exclusive like/dislike toggling

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod response;

use auth::TokenAuthority;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub auth: Arc<dyn TokenAuthority>,
    pub enforce_coupon_expiry: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async {
            Json(serde_json::json!({"status": "healthy", "service": "nextstore"}))
        }))
        .route("/api/v1/products", get(handlers::products::list_products).post(handlers::products::create_product))
        .route("/api/v1/products/rating", put(handlers::products::rate_product))
        .route("/api/v1/products/wishlist", put(handlers::products::toggle_wishlist))
        .route("/api/v1/products/slug/:slug", get(handlers::products::get_product_by_slug))
        .route(
            "/api/v1/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/api/v1/cart",
            get(handlers::cart::get_cart)
                .post(handlers::cart::add_to_cart)
                .delete(handlers::cart::empty_cart),
        )
        .route("/api/v1/cart/coupon", post(handlers::cart::apply_coupon))
        .route("/api/v1/orders", get(handlers::orders::get_user_orders).post(handlers::orders::place_order))
        .route("/api/v1/orders/all", get(handlers::orders::list_all_orders))
        .route("/api/v1/orders/:id", get(handlers::orders::get_order))
        .route("/api/v1/coupons", get(handlers::coupons::list_coupons).post(handlers::coupons::create_coupon))
        .route("/api/v1/coupons/:id/toggle", put(handlers::coupons::toggle_coupon))
        .route("/api/v1/coupons/:id", delete(handlers::coupons::delete_coupon))
        .route("/api/v1/blogs", get(handlers::blogs::list_blogs).post(handlers::blogs::create_blog))
        .route("/api/v1/blogs/:id/like", put(handlers::blogs::like_blog))
        .route("/api/v1/blogs/:id/dislike", put(handlers::blogs::dislike_blog))
        .route("/api/v1/blogs/:id", get(handlers::blogs::get_blog))
        .route("/api/v1/users", post(handlers::users::create_user))
        .route("/api/v1/users/wishlist", get(handlers::users::get_wishlist))
        .route("/api/v1/users/:id", get(handlers::users::get_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
