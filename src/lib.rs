//! Stockroom API
//!
//! Item records plus an append-only stock movement ledger whose entries are
//! applied to item quantities transactionally.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub items: services::ItemService,
    pub stock: services::StockService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        Self {
            items: services::ItemService::new(db.clone()),
            stock: services::StockService::new(db.clone()),
            db,
            config,
        }
    }
}

/// All `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/items", handlers::items::items_router())
        .nest("/stock", handlers::stock::stock_router())
        .nest("/health", handlers::health::health_router())
}

/// The full application router with request correlation and HTTP tracing.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(handlers::not_found)
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::entities::{item, stock_movement, MovementType};
    pub use crate::errors::{ServiceError, StockError};
    pub use crate::repositories::{ItemChanges, NewItem, NewStockMovement};
    pub use crate::services::{ItemService, StockService};
    pub use crate::AppState;
}
