use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a stock movement. The magnitude lives in `Model::quantity`
/// and is always positive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MovementType {
    #[sea_orm(string_value = "IN")]
    #[serde(rename = "IN")]
    #[strum(serialize = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    #[serde(rename = "OUT")]
    #[strum(serialize = "OUT")]
    Out,
    #[sea_orm(string_value = "ADJUSTMENT")]
    #[serde(rename = "ADJUSTMENT")]
    #[strum(serialize = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "TRANSFER")]
    #[serde(rename = "TRANSFER")]
    #[strum(serialize = "TRANSFER")]
    Transfer,
}

impl MovementType {
    /// Movements that draw stock down and therefore need enough on hand.
    pub fn consumes_stock(&self) -> bool {
        matches!(self, MovementType::Out | MovementType::Transfer)
    }
}

/// Immutable ledger entry. Rows are only ever inserted; they disappear solely
/// through the `ON DELETE CASCADE` of their owning item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub public_id: Uuid,
    pub item_id: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub location_id_from: Option<i32>,
    pub location_id_to: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
