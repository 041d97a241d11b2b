pub mod item;
pub mod stock_movement;

pub use item::Entity as Item;
pub use stock_movement::{Entity as StockMovement, MovementType};
