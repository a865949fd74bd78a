//! JSON response envelope: `{success, message, data, meta?}`.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self { success: true, message: message.into(), data, meta: None })
    }

    pub fn with_meta(message: impl Into<String>, data: T, meta: Meta) -> Json<Self> {
        Json(Self { success: true, message: message.into(), data, meta: Some(meta) })
    }
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self { total, page: None, total_pages: None }
    }

    pub fn paginated(total: i64, page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1) as i64;
        Self { total, page: Some(page), total_pages: Some((total + per_page - 1) / per_page) }
    }
}

/// SQL OFFSET for a 1-based page. Widened to i64 before multiplying so a
/// caller-supplied page near u32::MAX cannot overflow.
pub fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_meta_rounds_pages_up() {
        let meta = Meta::paginated(41, 1, 20);
        assert_eq!(meta.total_pages, Some(3));
    }

    #[test]
    fn test_page_offset_survives_max_page() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(u32::MAX, 20), (i64::from(u32::MAX) - 1) * 20);
    }

    #[test]
    fn test_meta_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::ok("done", 1).0).unwrap();
        assert!(body.get("meta").is_none());
        assert_eq!(body["success"], true);
    }
}
