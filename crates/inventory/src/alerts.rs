//! Low-stock warnings.

use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, ProductId};

use crate::stock::StockTotals;

/// Fraction of total received stock at or below which a product is "low".
pub const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 0.20;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockPolicy {
    threshold: f64,
}

impl LowStockPolicy {
    pub fn new(threshold: f64) -> DomainResult<Self> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(DomainError::validation(
                "low-stock threshold must be in (0, 1]",
            ));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Evaluate one product's totals.
    ///
    /// Products that never received stock are skipped (`total_in == 0`).
    pub fn evaluate(
        &self,
        product_id: &ProductId,
        product_name: &str,
        totals: StockTotals,
    ) -> Option<LowStockWarning> {
        if totals.total_in <= 0 {
            return None;
        }

        let balance = totals.balance();
        let ratio = balance as f64 / totals.total_in as f64;
        if ratio > self.threshold {
            return None;
        }

        Some(LowStockWarning {
            product_id: product_id.clone(),
            product_name: product_name.to_string(),
            balance,
            total_in: totals.total_in,
            ratio,
        })
    }
}

impl Default for LowStockPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockWarning {
    pub product_id: ProductId,
    pub product_name: String,
    pub balance: i64,
    pub total_in: i64,
    pub ratio: f64,
}

impl LowStockWarning {
    pub fn message(&self) -> String {
        format!(
            "{} is running low: {} left of {} received",
            self.product_name, self.balance, self.total_in
        )
    }
}
