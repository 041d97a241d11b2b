use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::stock_movement::{self, Column, Entity as StockMovement, MovementType};

/// A movement to be recorded against an item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStockMovement {
    pub item_id: i32,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    #[serde(default)]
    pub location_id_from: Option<i32>,
    #[serde(default)]
    pub location_id_to: Option<i32>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl NewStockMovement {
    pub fn new(item_id: i32, movement_type: MovementType, quantity: i32) -> Self {
        Self {
            item_id,
            movement_type,
            quantity,
            location_id_from: None,
            location_id_to: None,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn between(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.location_id_from = from;
        self.location_id_to = to;
        self
    }
}

/// Append-only movement ledger. There is intentionally no update or delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockMovementRepository;

impl StockMovementRepository {
    /// Appends a ledger row. Meant to run on the caller's transaction so the
    /// row commits together with the quantity change it describes.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        movement: NewStockMovement,
    ) -> Result<stock_movement::Model, DbErr> {
        let model = stock_movement::ActiveModel {
            public_id: Set(Uuid::new_v4()),
            item_id: Set(movement.item_id),
            movement_type: Set(movement.movement_type),
            quantity: Set(movement.quantity),
            location_id_from: Set(movement.location_id_from),
            location_id_to: Set(movement.location_id_to),
            reason: Set(movement.reason),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(conn).await
    }

    /// Movements of one item, newest first.
    pub async fn find_by_item_id<C: ConnectionTrait>(
        conn: &C,
        item_id: i32,
    ) -> Result<Vec<stock_movement::Model>, DbErr> {
        StockMovement::find()
            .filter(Column::ItemId.eq(item_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(conn)
            .await
    }
}
