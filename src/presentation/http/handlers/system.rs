//! Welcome, version and fallback endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::Query;
use axum::response::Response;
use serde_json::{Value, json};

use crate::presentation::http::error::ApiError;
use crate::presentation::http::response::success;

/// `GET /`
pub async fn welcome(Query(params): Query<BTreeMap<String, String>>) -> Response {
    success(
        format!("Welcome to {}", crate::NAME),
        json!({ "query": params }),
    )
}

/// `GET /version`
pub async fn version() -> Json<Value> {
    Json(json!({ "name": crate::NAME, "version": crate::VERSION }))
}

/// Any unmatched route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found.".to_string())
}
