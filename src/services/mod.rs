pub mod items;
pub mod stock;

pub use items::ItemService;
pub use stock::StockService;
