use crate::{
    db::DbPool,
    entities::stock_movement::{self, MovementType},
    errors::StockError,
    repositories::{ItemRepository, NewStockMovement, StockMovementRepository},
};
use sea_orm::{DbErr, TransactionError, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Computes the quantity an item holds after a movement.
///
/// * `IN` adds, `OUT` subtracts.
/// * `ADJUSTMENT` is an absolute recount and replaces the quantity.
/// * `TRANSFER` relocates stock without changing the total, but still needs
///   the transferred amount on hand.
pub fn next_quantity(
    item_id: i32,
    current: i32,
    movement_type: MovementType,
    quantity: i32,
) -> Result<i32, StockError> {
    if movement_type.consumes_stock() && current < quantity {
        return Err(StockError::InsufficientStock {
            item_id,
            available: current,
            requested: quantity,
        });
    }

    match movement_type {
        MovementType::In => current.checked_add(quantity).ok_or_else(|| {
            StockError::Validation(format!(
                "receiving {} units would overflow the quantity of item {}",
                quantity, item_id
            ))
        }),
        MovementType::Out => Ok(current - quantity),
        MovementType::Adjustment => Ok(quantity),
        MovementType::Transfer => Ok(current),
    }
}

/// Records stock movements and keeps item quantities consistent with the
/// ledger.
#[derive(Debug, Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Applies a movement to its item and appends it to the ledger as one
    /// transaction.
    ///
    /// The item row is locked for the duration, so concurrent movements on
    /// the same item run one after another. Any failure rolls back both the
    /// quantity change and the ledger row.
    #[instrument(
        skip(self, movement),
        fields(
            item_id = movement.item_id,
            movement_type = %movement.movement_type,
            quantity = movement.quantity
        )
    )]
    pub async fn record_movement(
        &self,
        movement: NewStockMovement,
    ) -> Result<stock_movement::Model, StockError> {
        if movement.quantity <= 0 {
            warn!("Rejected stock movement with non-positive quantity");
            return Err(StockError::Validation(format!(
                "quantity must be positive, got {}",
                movement.quantity
            )));
        }

        let db = self.db_pool.as_ref();
        let result = db
            .transaction::<_, (stock_movement::Model, i32, i32), StockError>(move |txn| {
                Box::pin(async move {
                    let item = ItemRepository::find_by_id_for_update(txn, movement.item_id)
                        .await?
                        .ok_or(StockError::NotFound(movement.item_id))?;

                    let new_quantity = next_quantity(
                        item.id,
                        item.quantity,
                        movement.movement_type,
                        movement.quantity,
                    )?;

                    let written =
                        ItemRepository::update_quantity(txn, item.id, item.quantity, new_quantity)
                            .await?;
                    if !written {
                        return Err(StockError::TransactionFailed(DbErr::RecordNotUpdated));
                    }

                    let record = StockMovementRepository::append(txn, movement).await?;
                    Ok((record, item.quantity, new_quantity))
                })
            })
            .await;

        match result {
            Ok((record, previous, current)) => {
                info!(
                    movement_id = record.id,
                    previous_quantity = previous,
                    new_quantity = current,
                    "Stock movement recorded"
                );
                Ok(record)
            }
            Err(TransactionError::Connection(e)) => {
                error!(error = %e, "Stock movement transaction could not be started or committed");
                Err(StockError::TransactionFailed(e))
            }
            Err(TransactionError::Transaction(e)) => {
                match &e {
                    StockError::TransactionFailed(db_err) => {
                        error!(error = %db_err, "Stock movement rolled back after store failure")
                    }
                    other => warn!(reason = %other, "Stock movement rejected"),
                }
                Err(e)
            }
        }
    }

    /// All movements of an item, newest first. Unknown items have no history.
    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        item_id: i32,
    ) -> Result<Vec<stock_movement::Model>, StockError> {
        StockMovementRepository::find_by_item_id(self.db_pool.as_ref(), item_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to read stock history");
                StockError::TransactionFailed(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::receive(10, MovementType::In, 5, 15)]
    #[case::issue(10, MovementType::Out, 3, 7)]
    #[case::issue_everything(10, MovementType::Out, 10, 0)]
    #[case::recount_down(10, MovementType::Adjustment, 4, 4)]
    #[case::recount_up(10, MovementType::Adjustment, 25, 25)]
    #[case::transfer_keeps_total(10, MovementType::Transfer, 6, 10)]
    fn computes_next_quantity(
        #[case] current: i32,
        #[case] movement_type: MovementType,
        #[case] quantity: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(
            next_quantity(1, current, movement_type, quantity).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(MovementType::Out)]
    #[case(MovementType::Transfer)]
    fn consuming_more_than_available_is_rejected(#[case] movement_type: MovementType) {
        assert_matches!(
            next_quantity(9, 10, movement_type, 15),
            Err(StockError::InsufficientStock {
                item_id: 9,
                available: 10,
                requested: 15
            })
        );
    }

    #[test]
    fn receiving_past_the_integer_limit_is_a_validation_error() {
        assert_matches!(
            next_quantity(1, i32::MAX - 1, MovementType::In, 2),
            Err(StockError::Validation(_))
        );
    }

    proptest! {
        #[test]
        fn never_produces_negative_stock(
            current in 0..=i32::MAX,
            quantity in 1..=i32::MAX,
            type_index in 0usize..4,
        ) {
            let movement_type = [
                MovementType::In,
                MovementType::Out,
                MovementType::Adjustment,
                MovementType::Transfer,
            ][type_index];

            match next_quantity(1, current, movement_type, quantity) {
                Ok(next) => prop_assert!(next >= 0),
                Err(StockError::InsufficientStock { .. }) => {
                    prop_assert!(movement_type.consumes_stock());
                    prop_assert!(current < quantity);
                }
                Err(StockError::Validation(_)) => {
                    prop_assert_eq!(movement_type, MovementType::In);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
