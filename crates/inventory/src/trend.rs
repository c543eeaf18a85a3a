//! Per-product daily stock series (chart data) and trend direction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::movement::Movement;

/// Stock moved on one day, with the running balance at the end of that day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStock {
    pub date: NaiveDate,
    pub stock_in: i64,
    pub stock_out: i64,
    pub balance: i64,
}

impl DailyStock {
    pub fn net(&self) -> i64 {
        self.stock_in.saturating_sub(self.stock_out)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Steady,
}

impl TrendDirection {
    /// Direction of the most recent day with activity.
    pub fn of(series: &[DailyStock]) -> Self {
        match series.last().map(DailyStock::net) {
            Some(net) if net > 0 => TrendDirection::Rising,
            Some(net) if net < 0 => TrendDirection::Falling,
            _ => TrendDirection::Steady,
        }
    }
}

/// Group one product's movements by `date_in`, oldest first.
pub fn daily_series<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Vec<DailyStock> {
    let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for m in movements {
        let entry = by_day.entry(m.date_in).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(m.stock_in);
        entry.1 = entry.1.saturating_add(m.stock_out);
    }

    let mut balance: i64 = 0;
    by_day
        .into_iter()
        .map(|(date, (stock_in, stock_out))| {
            balance = balance.saturating_add(stock_in).saturating_sub(stock_out);
            DailyStock {
                date,
                stock_in,
                stock_out,
                balance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use stockledger_core::{MovementId, ProductId};

    fn row(day: u32, stock_in: i64, stock_out: i64) -> Movement {
        Movement {
            id: MovementId(day as i64),
            product_id: ProductId::new("W-001").unwrap(),
            product_name: "Widget".to_string(),
            description: String::new(),
            stock_in,
            stock_out,
            price: 1.0,
            units: "pcs".to_string(),
            batch_id: String::new(),
            date_in: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time_in: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            date_out: None,
            time_out: None,
        }
    }

    #[test]
    fn series_groups_by_day_and_accumulates_balance() {
        // Out of order on purpose: the ledger is ordered by id, not by date.
        let rows = vec![row(3, 0, 10), row(1, 100, 0), row(1, 0, 20), row(2, 5, 0)];
        let series = daily_series(&rows);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!((series[0].stock_in, series[0].stock_out, series[0].balance), (100, 20, 80));
        assert_eq!(series[1].balance, 85);
        assert_eq!(series[2].balance, 75);
    }

    #[test]
    fn trend_follows_last_day_net() {
        assert_eq!(TrendDirection::of(&daily_series(&[row(1, 10, 0)])), TrendDirection::Rising);
        assert_eq!(
            TrendDirection::of(&daily_series(&[row(1, 10, 0), row(2, 0, 4)])),
            TrendDirection::Falling
        );
        assert_eq!(
            TrendDirection::of(&daily_series(&[row(1, 10, 0), row(2, 4, 4)])),
            TrendDirection::Steady
        );
        assert_eq!(TrendDirection::of(&[]), TrendDirection::Steady);
    }

    #[test]
    fn oversized_days_saturate_instead_of_overflowing() {
        let series = daily_series(&[row(1, i64::MAX, 0), row(1, 1, 0), row(2, 1, 0)]);
        assert_eq!(series[0].stock_in, i64::MAX);
        assert_eq!(series[1].balance, i64::MAX);
    }
}
