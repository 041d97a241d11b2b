//! HTTP surface. Handlers translate requests into service calls and service
//! errors into status codes; they hold no business rules.

pub mod health;
pub mod items;
pub mod stock;

use crate::errors::ServiceError;
use axum::response::IntoResponse;

/// Fallback for routes that do not exist.
pub async fn not_found() -> impl IntoResponse {
    ServiceError::NotFound("Route not found".to_string())
}
