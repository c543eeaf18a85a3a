//! SQLite-backed registry + ledger.
//!
//! Two tables:
//! - `product_registry`: keyed by `product_id`
//! - `inventory_log`: auto-increment `id`, one row per movement

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use stockledger_core::{MovementId, ProductId};
use stockledger_inventory::{Movement, NewMovement, Product, StockTotals};

use super::{InventoryRepository, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS product_registry (
        product_id    TEXT PRIMARY KEY NOT NULL,
        name          TEXT NOT NULL,
        description   TEXT NOT NULL DEFAULT '',
        unit_type     TEXT NOT NULL,
        batch_id      TEXT NOT NULL DEFAULT '',
        registered_on TEXT NOT NULL,
        total_units   INTEGER NULL,
        expires_on    TEXT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_log (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id   TEXT NOT NULL,
        product_name TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        stock_in     INTEGER NOT NULL CHECK (stock_in >= 0),
        stock_out    INTEGER NOT NULL CHECK (stock_out >= 0),
        price        REAL NOT NULL CHECK (price >= 0),
        units        TEXT NOT NULL,
        batch_id     TEXT NOT NULL DEFAULT '',
        date_in      TEXT NOT NULL,
        time_in      TEXT NOT NULL,
        date_out     TEXT NULL,
        time_out     TEXT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS inventory_log_product_idx
        ON inventory_log (product_id)
    "#,
];

const PRODUCT_COLUMNS: &str =
    "product_id, name, description, unit_type, batch_id, registered_on, total_units, expires_on";

const MOVEMENT_COLUMNS: &str = "id, product_id, product_name, description, stock_in, stock_out, \
     price, units, batch_id, date_in, time_in, date_out, time_out";

/// SQLite repository.
///
/// `SqlitePool` is cheap to clone; clones share the same connections.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `database_url` (e.g. `sqlite://stockledger.db` or
    /// `sqlite::memory:`) and create the tables if needed.
    ///
    /// In-memory databases live only as long as their connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let repo = Self { pool };
        repo.migrate().await?;
        tracing::info!(database_url, "sqlite store ready");
        Ok(repo)
    }

    /// Connect to a fresh private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Consistent copy of the whole database file.
    ///
    /// Uses `VACUUM INTO` a temporary file, so it works for file-backed and
    /// in-memory databases alike.
    pub async fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        let path = snapshot_path();
        let target = path.to_string_lossy().replace('\'', "''");

        sqlx::query(&format!("VACUUM INTO '{target}'"))
            .execute(&self.pool)
            .await?;

        let bytes = tokio::fs::read(&path).await;
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), "failed to remove database snapshot: {err}");
        }
        Ok(bytes?)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn snapshot_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("stockledger-snapshot-{}.db", uuid::Uuid::now_v7()));
    path
}

fn map_insert_error(err: sqlx::Error, key: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(key.to_string())
        }
        _ => StoreError::Database(err),
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, StoreError> {
    let id: String = row.try_get("product_id")?;
    Ok(Product {
        id: ProductId::new(&id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        unit_type: row.try_get("unit_type")?,
        batch_id: row.try_get("batch_id")?,
        registered_on: row.try_get("registered_on")?,
        total_units: row.try_get("total_units")?,
        expires_on: row.try_get("expires_on")?,
    })
}

fn movement_from_row(row: &SqliteRow) -> Result<Movement, StoreError> {
    let product_id: String = row.try_get("product_id")?;
    Ok(Movement {
        id: MovementId(row.try_get("id")?),
        product_id: ProductId::new(&product_id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        product_name: row.try_get("product_name")?,
        description: row.try_get("description")?,
        stock_in: row.try_get("stock_in")?,
        stock_out: row.try_get("stock_out")?,
        price: row.try_get("price")?,
        units: row.try_get("units")?,
        batch_id: row.try_get("batch_id")?,
        date_in: row.try_get("date_in")?,
        time_in: row.try_get("time_in")?,
        date_out: row.try_get("date_out")?,
        time_out: row.try_get("time_out")?,
    })
}

#[async_trait]
impl InventoryRepository for SqliteRepository {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product_registry WHERE product_id = ?1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO product_registry (
                product_id, name, description, unit_type, batch_id,
                registered_on, total_units, expires_on
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.unit_type)
        .bind(&product.batch_id)
        .bind(product.registered_on)
        .bind(product.total_units)
        .bind(product.expires_on)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, product.id.as_str()))?;

        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM product_registry WHERE product_id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product_registry ORDER BY registered_on, product_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn append_movement(&self, movement: &NewMovement) -> Result<Movement, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO inventory_log (
                product_id, product_name, description, stock_in, stock_out,
                price, units, batch_id, date_in, time_in, date_out, time_out
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(movement.product_id.as_str())
        .bind(&movement.product_name)
        .bind(&movement.description)
        .bind(movement.stock_in)
        .bind(movement.stock_out)
        .bind(movement.price)
        .bind(&movement.units)
        .bind(&movement.batch_id)
        .bind(movement.date_in)
        .bind(movement.time_in)
        .bind(movement.date_out)
        .bind(movement.time_out)
        .execute(&self.pool)
        .await?;

        Ok(movement
            .clone()
            .into_movement(MovementId(result.last_insert_rowid())))
    }

    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM inventory_log WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_log ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(movement_from_row).collect()
    }

    async fn product_movements(&self, id: &ProductId) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM inventory_log WHERE product_id = ?1 ORDER BY id"
        ))
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(movement_from_row).collect()
    }

    async fn stock_totals(&self, id: &ProductId) -> Result<StockTotals, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(stock_in), 0)  AS total_in,
                COALESCE(SUM(stock_out), 0) AS total_out
            FROM inventory_log
            WHERE product_id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(StockTotals::new(
            row.try_get("total_in")?,
            row.try_get("total_out")?,
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
            description: "Standard widget".to_string(),
            unit_type: "pcs".to_string(),
            batch_id: "B1".to_string(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_units: Some(100),
            expires_on: NaiveDate::from_ymd_opt(2025, 3, 1),
        }
    }

    fn new_movement(id: &str, stock_in: i64, stock_out: i64) -> NewMovement {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        NewMovement {
            product_id: ProductId::new(id).unwrap(),
            product_name: "Widget".to_string(),
            description: "Standard widget".to_string(),
            stock_in,
            stock_out,
            price: 2.5,
            units: "pcs".to_string(),
            batch_id: "B1".to_string(),
            date_in: date,
            time_in: time,
            date_out: (stock_out > 0).then_some(date),
            time_out: (stock_out > 0).then_some(time),
        }
    }

    #[tokio::test]
    async fn product_roundtrip_and_duplicate_rejection() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let widget = product("W-001");
        repo.insert_product(&widget).await.unwrap();

        let err = repo.insert_product(&product("W-001")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref key) if key == "W-001"));

        let loaded = repo.get_product(&widget.id).await.unwrap().unwrap();
        assert_eq!(loaded, widget);
        assert_eq!(repo.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_product_reports_whether_a_row_was_removed() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let widget = product("W-001");
        repo.insert_product(&widget).await.unwrap();

        assert!(repo.delete_product(&widget.id).await.unwrap());
        assert!(!repo.delete_product(&widget.id).await.unwrap());
        assert!(repo.get_product(&widget.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn movements_roundtrip_with_optional_out_timestamps() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let stocked = repo.append_movement(&new_movement("W-001", 100, 0)).await.unwrap();
        let issued = repo.append_movement(&new_movement("W-001", 0, 85)).await.unwrap();
        assert!(issued.id > stocked.id);

        let ledger = repo.list_movements().await.unwrap();
        assert_eq!(ledger, vec![stocked.clone(), issued.clone()]);
        assert_eq!(ledger[0].date_out, None);
        assert!(ledger[1].date_out.is_some());
    }

    #[tokio::test]
    async fn stock_totals_aggregate_per_product() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let widget = ProductId::new("W-001").unwrap();

        assert_eq!(repo.stock_totals(&widget).await.unwrap(), StockTotals::default());

        repo.append_movement(&new_movement("W-001", 100, 0)).await.unwrap();
        repo.append_movement(&new_movement("W-001", 0, 85)).await.unwrap();
        repo.append_movement(&new_movement("G-001", 7, 0)).await.unwrap();

        let totals = repo.stock_totals(&widget).await.unwrap();
        assert_eq!(totals.balance(), 15);
        assert_eq!(repo.product_movements(&widget).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_movement_removes_row() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let row = repo.append_movement(&new_movement("W-001", 5, 0)).await.unwrap();

        assert!(repo.delete_movement(row.id).await.unwrap());
        assert!(repo.list_movements().await.unwrap().is_empty());
        assert!(!repo.delete_movement(row.id).await.unwrap());
    }

    #[tokio::test]
    async fn snapshot_is_a_sqlite_file() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        repo.insert_product(&product("W-001")).await.unwrap();

        let bytes = repo.snapshot().await.unwrap();
        assert!(bytes.starts_with(b"SQLite format 3\0"));
    }
}
