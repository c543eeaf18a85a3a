//! Registry + ledger storage abstraction.
//!
//! The repository is deliberately narrow: get-by-id, append, delete, list and a
//! per-product aggregate. Business rules (validation, balance checks) stay in
//! `stockledger-inventory` and are orchestrated by [`crate::service`].

pub mod in_memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockledger_core::{MovementId, ProductId};
use stockledger_inventory::{Movement, NewMovement, Product, StockTotals};

pub use in_memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// Storage operation error.
///
/// These are **infrastructure errors**, as opposed to domain errors
/// (validation, stock rules).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A stored row could not be mapped back into a domain record.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a new product. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Returns `false` if no product had this id.
    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Append a ledger row; the store assigns the id.
    async fn append_movement(&self, movement: &NewMovement) -> Result<Movement, StoreError>;

    /// Returns `false` if no row had this id.
    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError>;

    /// Full ledger, ordered by id.
    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError>;

    /// Ledger rows of one product, ordered by id.
    async fn product_movements(&self, id: &ProductId) -> Result<Vec<Movement>, StoreError>;

    /// Σ stock_in and Σ stock_out over one product's rows.
    async fn stock_totals(&self, id: &ProductId) -> Result<StockTotals, StoreError>;
}

#[async_trait]
impl<R> InventoryRepository for Arc<R>
where
    R: InventoryRepository + ?Sized,
{
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        (**self).insert_product(product).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        (**self).delete_product(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_products().await
    }

    async fn append_movement(&self, movement: &NewMovement) -> Result<Movement, StoreError> {
        (**self).append_movement(movement).await
    }

    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError> {
        (**self).delete_movement(id).await
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        (**self).list_movements().await
    }

    async fn product_movements(&self, id: &ProductId) -> Result<Vec<Movement>, StoreError> {
        (**self).product_movements(id).await
    }

    async fn stock_totals(&self, id: &ProductId) -> Result<StockTotals, StoreError> {
        (**self).stock_totals(id).await
    }
}
