//! Stateless data access.
//!
//! Every function takes the connection to run on, so the same code serves
//! plain pool reads and the statements of an open `DatabaseTransaction`.

pub mod items;
pub mod stock_movements;

pub use items::{ItemChanges, ItemRepository, NewItem};
pub use stock_movements::{NewStockMovement, StockMovementRepository};
