//! Inventory domain module.
//!
//! This crate contains business rules for the product registry and the stock
//! movement ledger, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod alerts;
pub mod movement;
pub mod product;
pub mod stock;
pub mod summary;
pub mod trend;

pub use alerts::{LowStockPolicy, LowStockWarning};
pub use movement::{Movement, NewMovement, RecordMovement};
pub use product::{Product, RegisterProduct};
pub use stock::{StockTotals, check_movement};
pub use summary::{InventoryOverview, ProductSummary};
pub use trend::{DailyStock, TrendDirection};
