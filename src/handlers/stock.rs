use crate::{errors::ServiceError, repositories::NewStockMovement, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/move", post(record_movement))
        .route("/history/:item_id", get(movement_history))
}

/// Records a stock movement and returns the ledger entry.
pub async fn record_movement(
    State(state): State<AppState>,
    Json(movement): Json<NewStockMovement>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.stock.record_movement(movement).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Movement history of one item, newest first.
pub async fn movement_history(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let history = state.stock.get_history(item_id).await?;
    Ok(Json(history))
}
