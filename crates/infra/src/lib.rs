//! Infrastructure layer: SQLite store, configuration, exports, query console.

pub mod config;
pub mod export;
pub mod query_console;
pub mod repository;
pub mod service;

pub use config::{AppConfig, AppConfigError, LogFormat};
pub use export::ExportError;
pub use query_console::{Cell, QueryConsole, QueryError, QueryHistory, QueryResult};
pub use repository::{InMemoryRepository, InventoryRepository, SqliteRepository, StoreError};
pub use service::{InventoryService, ProductTrend, RecordedMovement, ServiceError};
