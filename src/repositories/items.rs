use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbBackend,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::item::{self, Column, Entity as Item};

/// Fields accepted when creating an item.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewItem {
    #[validate(custom = "validate_name")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Opening stock, defaults to zero
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Sparse update of an item's descriptive fields.
///
/// `None` leaves a field untouched. For nullable columns `Some(None)` clears
/// the value. Stock levels are not part of this mask; they move only through
/// recorded stock movements.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ItemChanges {
    #[validate(custom = "validate_name")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub location_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "present")]
    pub purchase_date: Option<Option<DateTime<Utc>>>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.location_id.is_none()
            && self.price.is_none()
            && self.purchase_date.is_none()
    }

    fn into_active_model(self) -> item::ActiveModel {
        let mut model = <item::ActiveModel as Default>::default();
        if let Some(name) = self.name {
            model.name = Set(name);
        }
        if let Some(description) = self.description {
            model.description = Set(description);
        }
        if let Some(category_id) = self.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(location_id) = self.location_id {
            model.location_id = Set(location_id);
        }
        if let Some(price) = self.price {
            model.price = Set(price);
        }
        if let Some(purchase_date) = self.purchase_date {
            model.purchase_date = Set(purchase_date);
        }
        model.updated_at = Set(Utc::now());
        model
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name");
        err.message = Some("name must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Item store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemRepository;

impl ItemRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<item::Model>, DbErr> {
        Item::find_by_id(id).one(conn).await
    }

    /// Reads an item and holds a row lock on it until the surrounding
    /// transaction ends.
    ///
    /// SQLite has no row locks. There the transaction first rewrites the
    /// row's quantity with itself, which takes the database writer lock
    /// before anything is read. Competing writers then wait on the busy
    /// timeout and see the committed quantity once they get the lock.
    pub async fn find_by_id_for_update<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<item::Model>, DbErr> {
        let query = Item::find_by_id(id);
        if conn.get_database_backend() == DbBackend::Sqlite {
            Item::update_many()
                .col_expr(Column::Quantity, Expr::col(Column::Quantity).into())
                .filter(Column::Id.eq(id))
                .exec(conn)
                .await?;
            query.one(conn).await
        } else {
            query.lock_exclusive().one(conn).await
        }
    }

    pub async fn find_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<item::Model>, DbErr> {
        Item::find().order_by_asc(Column::Id).all(conn).await
    }

    /// Inserts a new item and returns the stored row.
    pub async fn insert<C: ConnectionTrait>(conn: &C, new: NewItem) -> Result<item::Model, DbErr> {
        let now = Utc::now();
        let model = item::ActiveModel {
            public_id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
            category_id: Set(new.category_id),
            location_id: Set(new.location_id),
            quantity: Set(new.quantity.unwrap_or(0)),
            price: Set(new.price),
            purchase_date: Set(new.purchase_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(conn).await
    }

    /// Applies the present fields of `changes`. Returns whether a row matched.
    pub async fn update_fields<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        changes: ItemChanges,
    ) -> Result<bool, DbErr> {
        if changes.is_empty() {
            return Ok(false);
        }

        let result = Item::update_many()
            .set(changes.into_active_model())
            .filter(Column::Id.eq(id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Writes a new quantity only if the stored value still equals `expected`.
    ///
    /// Returns `false` when the row is gone or was changed since it was read.
    pub async fn update_quantity<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        expected: i32,
        new_quantity: i32,
    ) -> Result<bool, DbErr> {
        let result = Item::update_many()
            .col_expr(Column::Quantity, Expr::value(new_quantity))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::Quantity.eq(expected))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Deletes an item; its movements go with it through the foreign key.
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, DbErr> {
        let result = Item::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_are_distinct() {
        let changes: ItemChanges =
            serde_json::from_str(r#"{"description": null, "location_id": 4}"#).unwrap();

        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.location_id, Some(Some(4)));
        assert_eq!(changes.category_id, None);
        assert_eq!(changes.name, None);
        assert!(!changes.is_empty());
    }

    #[test]
    fn empty_body_is_an_empty_mask() {
        let changes: ItemChanges = serde_json::from_str("{}").unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn quantity_is_not_an_updatable_field() {
        let result = serde_json::from_str::<ItemChanges>(r#"{"quantity": 50}"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_item_rejects_blank_name_and_negative_quantity() {
        let blank = NewItem {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let negative = NewItem {
            name: "Widget".into(),
            quantity: Some(-1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let ok = NewItem {
            name: "Widget".into(),
            quantity: Some(0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
