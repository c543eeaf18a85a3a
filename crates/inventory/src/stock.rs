//! Stock balance computation and movement validation.
//!
//! A product's balance is never stored: it is derived from its ledger rows as
//! `Σ stock_in − Σ stock_out` every time it is needed.
//!
//! A stock-out is checked against the balance *before* the submitted row. The
//! row's own stock-in does not count toward covering its stock-out, so a product
//! with no history rejects every stock-out.

use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult};

use crate::movement::Movement;

/// Cumulative stock received and issued for one product.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTotals {
    pub total_in: i64,
    pub total_out: i64,
}

impl StockTotals {
    pub fn new(total_in: i64, total_out: i64) -> Self {
        Self {
            total_in,
            total_out,
        }
    }

    /// Fold a product's ledger rows into totals.
    ///
    /// Saturates instead of overflowing; accepted rows never push a total past
    /// `i64::MAX` (see [`StockTotals::after`]).
    pub fn from_movements<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Self {
        movements.into_iter().fold(Self::default(), |acc, m| Self {
            total_in: acc.total_in.saturating_add(m.stock_in),
            total_out: acc.total_out.saturating_add(m.stock_out),
        })
    }

    pub fn balance(&self) -> i64 {
        self.total_in - self.total_out
    }

    /// Totals once a further movement has been applied.
    ///
    /// Fails when either total would overflow.
    pub fn after(&self, stock_in: i64, stock_out: i64) -> DomainResult<Self> {
        match (
            self.total_in.checked_add(stock_in),
            self.total_out.checked_add(stock_out),
        ) {
            (Some(total_in), Some(total_out)) => Ok(Self {
                total_in,
                total_out,
            }),
            _ => Err(DomainError::validation(
                "quantity too large: stock totals would overflow",
            )),
        }
    }
}

/// Validate a proposed movement against the product's prior totals.
///
/// Returns the totals after the movement on success. Rejects with
/// [`DomainError::InsufficientStock`] when `stock_out` exceeds the prior
/// balance; nothing should be persisted in that case.
pub fn check_movement(prior: StockTotals, stock_in: i64, stock_out: i64) -> DomainResult<StockTotals> {
    if stock_in < 0 || stock_out < 0 {
        return Err(DomainError::validation("quantities cannot be negative"));
    }

    let available = prior.balance();
    if stock_out > available {
        return Err(DomainError::insufficient_stock(stock_out, available));
    }

    prior.after(stock_in, stock_out)
}
