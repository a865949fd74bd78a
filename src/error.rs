//! Error taxonomy surfaced to callers as non-2xx JSON envelopes.
//! No retries anywhere; any failure aborts the request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Product not found or maybe removed...")]
    ProductNotFound,

    #[error("Cart not found or maybe removed...")]
    CartNotFound,

    #[error("Coupon not found or maybe removed...")]
    CouponNotFound,

    #[error("Invalid coupon, try another one...")]
    InvalidCoupon,

    #[error("Coupon has expired, try another one...")]
    CouponExpired,

    #[error("Blog not found or maybe removed...")]
    BlogNotFound,

    #[error("User not found...")]
    UserNotFound,

    #[error("Order not found or maybe removed...")]
    OrderNotFound,

    #[error("User already exists...")]
    UserAlreadyExists,

    #[error("{0}")]
    Validation(String),

    #[error("Not authorized or token expired...")]
    Unauthorized,

    #[error("Not enough stock for product {product_id}...")]
    InsufficientStock { product_id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProductNotFound
            | Self::CartNotFound
            | Self::CouponNotFound
            | Self::InvalidCoupon
            | Self::BlogNotFound
            | Self::UserNotFound
            | Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::CouponExpired => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists | Self::InsufficientStock { .. } => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "success": false, "message": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
