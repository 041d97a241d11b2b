use crate::{
    db::DbPool,
    entities::item,
    errors::ServiceError,
    repositories::{ItemChanges, ItemRepository, NewItem},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

const NOTHING_UPDATED: &str = "Item not found or no changes made";

/// CRUD over item records. Stock levels are read here but never written.
#[derive(Debug, Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<item::Model>, ServiceError> {
        ItemRepository::find_all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<item::Model, ServiceError> {
        ItemRepository::find_by_id(self.db_pool.as_ref(), id)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    #[instrument(skip(self, new_item), fields(name = %new_item.name))]
    pub async fn create(&self, new_item: NewItem) -> Result<item::Model, ServiceError> {
        new_item.validate()?;

        let db = self.db_pool.as_ref();
        let inserted = ItemRepository::insert(db, new_item)
            .await
            .map_err(ServiceError::db_error)?;

        let stored = ItemRepository::find_by_id(db, inserted.id)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "item {} vanished after insert",
                    inserted.id
                ))
            })?;

        info!(item_id = stored.id, quantity = stored.quantity, "Item created");
        Ok(stored)
    }

    /// Applies a sparse update and returns the stored record.
    ///
    /// An empty change set is reported the same way as a missing item.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: ItemChanges) -> Result<item::Model, ServiceError> {
        changes.validate()?;

        if changes.is_empty() {
            warn!("Item update carried no changes");
            return Err(ServiceError::NotFound(NOTHING_UPDATED.to_string()));
        }

        let db = self.db_pool.as_ref();
        let updated = ItemRepository::update_fields(db, id, changes)
            .await
            .map_err(ServiceError::db_error)?;
        if !updated {
            return Err(ServiceError::NotFound(NOTHING_UPDATED.to_string()));
        }

        let stored = ItemRepository::find_by_id(db, id)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;

        info!(item_id = id, "Item updated");
        Ok(stored)
    }

    /// Deletes an item together with its movement history.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let removed = ItemRepository::delete(self.db_pool.as_ref(), id)
            .await
            .map_err(ServiceError::db_error)?;

        if !removed {
            return Err(ServiceError::NotFound(format!("Item {} not found", id)));
        }

        info!(item_id = id, "Item deleted");
        Ok(())
    }
}
