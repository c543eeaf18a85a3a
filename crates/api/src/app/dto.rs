use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;
use stockledger_inventory::{
    LowStockWarning, Movement, Product, ProductSummary, RecordMovement, RegisterProduct,
    StockTotals,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_type: String,
    #[serde(default)]
    pub batch_id: String,
    /// Defaults to today.
    pub registered_on: Option<NaiveDate>,
    pub total_units: Option<i64>,
    pub expires_on: Option<NaiveDate>,
}

impl RegisterProductRequest {
    pub fn into_command(self, today: NaiveDate) -> RegisterProduct {
        RegisterProduct {
            id: self.product_id,
            name: self.name,
            description: self.description,
            unit_type: self.unit_type,
            batch_id: self.batch_id,
            registered_on: self.registered_on.unwrap_or(today),
            total_units: self.total_units,
            expires_on: self.expires_on,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub product_id: ProductId,
    pub stock_in: i64,
    pub stock_out: i64,
    pub price: f64,
    /// Defaults to the time the request is handled.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl RecordMovementRequest {
    pub fn into_command(self, now: DateTime<Utc>) -> RecordMovement {
        RecordMovement {
            product_id: self.product_id,
            stock_in: self.stock_in,
            stock_out: self.stock_out,
            price: self.price,
            occurred_at: self.occurred_at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovementList {
    pub movements: Vec<Movement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordedMovementResponse {
    pub movement: Movement,
    pub total_in: i64,
    pub total_out: i64,
    pub balance: i64,
    pub low_stock: Option<LowStockWarning>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub product_id: ProductId,
    pub total_in: i64,
    pub total_out: i64,
    pub balance: i64,
    pub low_stock: Option<LowStockWarning>,
}

impl BalanceResponse {
    pub fn new(product_id: ProductId, totals: StockTotals, low_stock: Option<LowStockWarning>) -> Self {
        Self {
            product_id,
            total_in: totals.total_in,
            total_out: totals.total_out,
            balance: totals.balance(),
            low_stock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub low_stock_threshold: f64,
    pub summaries: Vec<ProductSummary>,
    pub warnings: Vec<LowStockWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryHistoryResponse {
    pub history: Vec<String>,
}
