#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::item,
    repositories::{ItemRepository, NewItem},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness for spinning up an application backed by SQLite.
///
/// `new` uses an in-memory database with exactly one pooled connection,
/// since every connection to `:memory:` is its own database. Tests that need
/// transactions to overlap use `file_backed` instead.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_database("sqlite::memory:".to_string(), 1).await
    }

    /// Application over a SQLite file in `dir`, served by a pool of
    /// `max_connections` so transactions really run side by side.
    pub async fn file_backed(dir: &TempDir, max_connections: u32) -> Self {
        let path = dir.path().join("stockroom.db");
        Self::with_database(
            format!("sqlite://{}?mode=rwc", path.display()),
            max_connections,
        )
        .await
    }

    async fn with_database(database_url: String, max_connections: u32) -> Self {
        let mut cfg = AppConfig::new(
            database_url,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = max_connections;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_with_config(&DbConfig::from(&cfg))
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = stockroom_api::app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        self.state.db.as_ref()
    }

    /// Inserts an item with the given opening quantity.
    pub async fn seed_item(&self, name: &str, quantity: i32) -> item::Model {
        ItemRepository::insert(
            self.db(),
            NewItem {
                name: name.to_string(),
                quantity: Some(quantity),
                ..Default::default()
            },
        )
        .await
        .expect("failed to seed item")
    }

    pub async fn quantity_of(&self, id: i32) -> i32 {
        ItemRepository::find_by_id(self.db(), id)
            .await
            .expect("failed to read item")
            .expect("item should exist")
            .quantity
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
