use std::sync::RwLock;

use async_trait::async_trait;

use stockledger_core::{Entity, MovementId, ProductId};
use stockledger_inventory::{Movement, NewMovement, Product, StockTotals};

use super::{InventoryRepository, StoreError};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    movements: Vec<Movement>,
    next_movement_id: i64,
}

/// In-memory registry + ledger for tests/dev.
///
/// Keeps insertion order; movement ids are never reused after a delete.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Corrupt("in-memory tables lock poisoned".to_string())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryRepository {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let tables = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(tables.products.iter().find(|p| p.has_id(id)).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| Self::poisoned())?;
        if tables.products.iter().any(|p| p.has_id(product.id())) {
            return Err(StoreError::Duplicate(product.id.to_string()));
        }
        tables.products.push(product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| Self::poisoned())?;
        let before = tables.products.len();
        tables.products.retain(|p| !p.has_id(id));
        Ok(tables.products.len() != before)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(tables.products.clone())
    }

    async fn append_movement(&self, movement: &NewMovement) -> Result<Movement, StoreError> {
        let mut tables = self.inner.write().map_err(|_| Self::poisoned())?;
        tables.next_movement_id += 1;
        let stored = movement
            .clone()
            .into_movement(MovementId(tables.next_movement_id));
        tables.movements.push(stored.clone());
        Ok(stored)
    }

    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| Self::poisoned())?;
        let before = tables.movements.len();
        tables.movements.retain(|m| !m.has_id(&id));
        Ok(tables.movements.len() != before)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let tables = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(tables.movements.clone())
    }

    async fn product_movements(&self, id: &ProductId) -> Result<Vec<Movement>, StoreError> {
        let tables = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(tables
            .movements
            .iter()
            .filter(|m| &m.product_id == id)
            .cloned()
            .collect())
    }

    async fn stock_totals(&self, id: &ProductId) -> Result<StockTotals, StoreError> {
        let tables = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(StockTotals::from_movements(
            tables.movements.iter().filter(|m| &m.product_id == id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: "Widget".to_string(),
            description: String::new(),
            unit_type: "pcs".to_string(),
            batch_id: String::new(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_units: None,
            expires_on: None,
        }
    }

    fn new_movement(id: &str, stock_in: i64, stock_out: i64) -> NewMovement {
        NewMovement {
            product_id: ProductId::new(id).unwrap(),
            product_name: "Widget".to_string(),
            description: String::new(),
            stock_in,
            stock_out,
            price: 1.0,
            units: "pcs".to_string(),
            batch_id: String::new(),
            date_in: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            date_out: None,
            time_out: None,
        }
    }

    #[tokio::test]
    async fn duplicate_product_is_rejected_and_original_kept() {
        let repo = InMemoryRepository::new();
        repo.insert_product(&product("W-001")).await.unwrap();

        let mut other = product("W-001");
        other.name = "Impostor".to_string();
        let err = repo.insert_product(&other).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let kept = repo
            .get_product(&ProductId::new("W-001").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.name, "Widget");
    }

    #[tokio::test]
    async fn movement_ids_are_not_reused_after_delete() {
        let repo = InMemoryRepository::new();
        let first = repo.append_movement(&new_movement("W-001", 5, 0)).await.unwrap();
        assert!(repo.delete_movement(first.id).await.unwrap());
        let second = repo.append_movement(&new_movement("W-001", 5, 0)).await.unwrap();
        assert!(second.id > first.id);
        assert!(!repo.delete_movement(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn stock_totals_are_scoped_to_product() {
        let repo = InMemoryRepository::new();
        repo.append_movement(&new_movement("W-001", 10, 0)).await.unwrap();
        repo.append_movement(&new_movement("W-001", 0, 4)).await.unwrap();
        repo.append_movement(&new_movement("G-001", 50, 0)).await.unwrap();

        let totals = repo
            .stock_totals(&ProductId::new("W-001").unwrap())
            .await
            .unwrap();
        assert_eq!(totals, StockTotals::new(10, 4));
    }
}
