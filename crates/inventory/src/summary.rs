//! Dashboard aggregates: per-product totals and low-stock warnings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;

use crate::alerts::{LowStockPolicy, LowStockWarning};
use crate::movement::Movement;
use crate::product::Product;
use crate::stock::StockTotals;
use crate::trend::{TrendDirection, daily_series};

/// Aggregated view of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_type: String,
    pub total_in: i64,
    pub total_out: i64,
    pub balance: i64,
    pub movement_count: usize,
    pub last_movement_on: Option<NaiveDate>,
    /// `false` when the product has ledger rows but was removed from the registry.
    pub registered: bool,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryOverview {
    pub summaries: Vec<ProductSummary>,
    pub warnings: Vec<LowStockWarning>,
}

impl InventoryOverview {
    /// Aggregate full reads of the registry and the ledger.
    ///
    /// Every product in either table gets a summary, ordered by product id.
    pub fn build(products: &[Product], movements: &[Movement], policy: &LowStockPolicy) -> Self {
        let mut ledger: BTreeMap<&ProductId, Vec<&Movement>> = BTreeMap::new();
        for m in movements {
            ledger.entry(&m.product_id).or_default().push(m);
        }

        let registry: BTreeMap<&ProductId, &Product> =
            products.iter().map(|p| (&p.id, p)).collect();

        let mut ids: Vec<&ProductId> = registry.keys().copied().collect();
        ids.extend(ledger.keys().copied().filter(|id| !registry.contains_key(id)));
        ids.sort();

        let mut summaries = Vec::with_capacity(ids.len());
        let mut warnings = Vec::new();

        for id in ids {
            let rows = ledger.get(id).map(Vec::as_slice).unwrap_or(&[]);
            let totals = StockTotals::from_movements(rows.iter().copied());
            let series = daily_series(rows.iter().copied());

            let product = registry.get(id);
            let latest = rows.iter().max_by_key(|m| m.id);
            let (product_name, unit_type) = match (product, latest) {
                (Some(p), _) => (p.name.clone(), p.unit_type.clone()),
                (None, Some(m)) => (m.product_name.clone(), m.units.clone()),
                (None, None) => (String::new(), String::new()),
            };

            if let Some(warning) = policy.evaluate(id, &product_name, totals) {
                warnings.push(warning);
            }

            summaries.push(ProductSummary {
                product_id: id.clone(),
                product_name,
                unit_type,
                total_in: totals.total_in,
                total_out: totals.total_out,
                balance: totals.balance(),
                movement_count: rows.len(),
                last_movement_on: rows.iter().map(|m| m.date_in).max(),
                registered: product.is_some(),
                trend: TrendDirection::of(&series),
            });
        }

        Self {
            summaries,
            warnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use stockledger_core::MovementId;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: name.to_string(),
            description: String::new(),
            unit_type: "pcs".to_string(),
            batch_id: String::new(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_units: None,
            expires_on: None,
        }
    }

    fn row(id: i64, product_id: &str, name: &str, stock_in: i64, stock_out: i64) -> Movement {
        Movement {
            id: MovementId(id),
            product_id: ProductId::new(product_id).unwrap(),
            product_name: name.to_string(),
            description: String::new(),
            stock_in,
            stock_out,
            price: 1.0,
            units: "kg".to_string(),
            batch_id: String::new(),
            date_in: NaiveDate::from_ymd_opt(2024, 3, id as u32).unwrap(),
            time_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            date_out: None,
            time_out: None,
        }
    }

    #[test]
    fn empty_inputs_give_empty_overview() {
        let overview = InventoryOverview::build(&[], &[], &LowStockPolicy::default());
        assert!(overview.is_empty());
        assert!(overview.warnings.is_empty());
    }

    #[test]
    fn summarizes_registered_products_and_flags_low_stock() {
        let products = vec![product("W-001", "Widget"), product("G-001", "Gadget")];
        let movements = vec![
            row(1, "W-001", "Widget", 100, 0),
            row(2, "W-001", "Widget", 0, 85),
            row(3, "G-001", "Gadget", 50, 10),
        ];

        let overview = InventoryOverview::build(&products, &movements, &LowStockPolicy::default());

        assert_eq!(overview.summaries.len(), 2);
        let gadget = &overview.summaries[0];
        assert_eq!(gadget.product_id.as_str(), "G-001");
        assert_eq!(gadget.balance, 40);
        assert_eq!(gadget.trend, TrendDirection::Rising);

        let widget = &overview.summaries[1];
        assert_eq!(widget.balance, 15);
        assert_eq!(widget.movement_count, 2);
        assert_eq!(widget.trend, TrendDirection::Falling);
        assert_eq!(widget.last_movement_on, NaiveDate::from_ymd_opt(2024, 3, 2));

        assert_eq!(overview.warnings.len(), 1);
        assert_eq!(overview.warnings[0].product_name, "Widget");
    }

    #[test]
    fn registered_product_without_movements_has_zero_totals_and_no_warning() {
        let overview = InventoryOverview::build(
            &[product("W-001", "Widget")],
            &[],
            &LowStockPolicy::default(),
        );
        let summary = &overview.summaries[0];
        assert_eq!((summary.total_in, summary.balance), (0, 0));
        assert_eq!(summary.trend, TrendDirection::Steady);
        assert!(overview.warnings.is_empty());
    }

    #[test]
    fn ledger_rows_of_deleted_products_still_summarized() {
        let overview = InventoryOverview::build(
            &[],
            &[row(1, "OLD-1", "Retired", 10, 0)],
            &LowStockPolicy::default(),
        );
        let summary = &overview.summaries[0];
        assert!(!summary.registered);
        assert_eq!(summary.product_name, "Retired");
        assert_eq!(summary.unit_type, "kg");
    }
}
