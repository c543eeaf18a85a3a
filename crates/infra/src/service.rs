//! Inventory service: orchestrates domain rules over a repository.
//!
//! ```text
//! RecordMovement
//!   ↓
//! 1. Look up the product (denormalised fields come from the registry)
//!   ↓
//! 2. Aggregate prior totals from the ledger
//!   ↓
//! 3. check_movement (pure decision logic)
//!   ↓
//! 4. Append the row
//! ```
//!
//! Steps 2-4 run under a write lock so two submissions for the same stock cannot
//! both pass the balance check.

use serde::Serialize;
use tokio::sync::Mutex;

use stockledger_core::{DomainError, MovementId, ProductId};
use stockledger_inventory::{
    DailyStock, InventoryOverview, LowStockPolicy, Movement, NewMovement, Product,
    RecordMovement, RegisterProduct, StockTotals, TrendDirection, check_movement, trend,
};

use crate::repository::{InventoryRepository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Deterministic input validation failure.
    #[error("{0}")]
    Validation(String),

    /// Stock-out larger than the balance before the submission.
    #[error("cannot remove {attempted} units: only {available} available")]
    InsufficientStock { attempted: i64, available: i64 },

    /// Product id already registered.
    #[error("product {0} is already registered")]
    Duplicate(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InsufficientStock {
                attempted,
                available,
            } => ServiceError::InsufficientStock {
                attempted,
                available,
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(key) => ServiceError::Duplicate(key),
            other => ServiceError::Store(other),
        }
    }
}

/// Outcome of an accepted movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedMovement {
    pub movement: Movement,
    pub totals: StockTotals,
    pub balance: i64,
}

/// A product's chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTrend {
    pub product_id: ProductId,
    pub direction: TrendDirection,
    pub series: Vec<DailyStock>,
}

#[derive(Debug)]
pub struct InventoryService<R> {
    repo: R,
    policy: LowStockPolicy,
    write_lock: Mutex<()>,
}

impl<R> InventoryService<R>
where
    R: InventoryRepository,
{
    pub fn new(repo: R, policy: LowStockPolicy) -> Self {
        Self {
            repo,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &LowStockPolicy {
        &self.policy
    }

    pub async fn register_product(&self, cmd: RegisterProduct) -> Result<Product, ServiceError> {
        let product = cmd.into_product()?;
        self.repo.insert_product(&product).await.map_err(|err| {
            if let StoreError::Duplicate(_) = err {
                tracing::info!(product_id = %product.id, "duplicate product registration rejected");
            }
            ServiceError::from(err)
        })?;

        tracing::info!(product_id = %product.id, name = %product.name, "product registered");
        Ok(product)
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repo.list_products().await?)
    }

    /// Remove a product from the registry. Its ledger rows are kept.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ServiceError> {
        if !self.repo.delete_product(id).await? {
            return Err(ServiceError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Validate and append a movement.
    ///
    /// The stock-out is checked against the balance before this submission;
    /// on rejection the ledger is left untouched.
    pub async fn record_movement(&self, cmd: RecordMovement) -> Result<RecordedMovement, ServiceError> {
        let product = self.get_product(&cmd.product_id).await?;
        let row = NewMovement::for_product(&product, &cmd)?;

        let _guard = self.write_lock.lock().await;

        let prior = self.repo.stock_totals(&product.id).await?;
        let totals = match check_movement(prior, row.stock_in, row.stock_out) {
            Ok(totals) => totals,
            Err(err @ DomainError::InsufficientStock { .. }) => {
                tracing::info!(
                    product_id = %product.id,
                    attempted = row.stock_out,
                    available = prior.balance(),
                    "stock-out rejected"
                );
                return Err(err.into());
            }
            Err(err) => {
                tracing::info!(product_id = %product.id, "movement rejected: {err}");
                return Err(err.into());
            }
        };

        let movement = self.repo.append_movement(&row).await?;
        tracing::info!(
            product_id = %product.id,
            movement_id = %movement.id,
            stock_in = movement.stock_in,
            stock_out = movement.stock_out,
            balance = totals.balance(),
            "movement recorded"
        );

        Ok(RecordedMovement {
            movement,
            totals,
            balance: totals.balance(),
        })
    }

    pub async fn list_movements(&self) -> Result<Vec<Movement>, ServiceError> {
        Ok(self.repo.list_movements().await?)
    }

    pub async fn product_movements(&self, id: &ProductId) -> Result<Vec<Movement>, ServiceError> {
        Ok(self.repo.product_movements(id).await?)
    }

    pub async fn delete_movement(&self, id: MovementId) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        if !self.repo.delete_movement(id).await? {
            return Err(ServiceError::NotFound(format!("movement {id}")));
        }
        tracing::info!(movement_id = %id, "movement deleted");
        Ok(())
    }

    pub async fn product_balance(&self, id: &ProductId) -> Result<StockTotals, ServiceError> {
        Ok(self.repo.stock_totals(id).await?)
    }

    pub async fn product_trend(&self, id: &ProductId) -> Result<ProductTrend, ServiceError> {
        let movements = self.repo.product_movements(id).await?;
        let series = trend::daily_series(&movements);
        Ok(ProductTrend {
            product_id: id.clone(),
            direction: TrendDirection::of(&series),
            series,
        })
    }

    /// Full re-read of registry and ledger, aggregated for the dashboard.
    pub async fn overview(&self) -> Result<InventoryOverview, ServiceError> {
        let products = self.repo.list_products().await?;
        let movements = self.repo.list_movements().await?;
        let overview = InventoryOverview::build(&products, &movements, &self.policy);

        for warning in &overview.warnings {
            tracing::warn!(
                product_id = %warning.product_id,
                balance = warning.balance,
                total_in = warning.total_in,
                "{}",
                warning.message()
            );
        }

        Ok(overview)
    }
}
