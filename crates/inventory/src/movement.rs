use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, MovementId, ProductId};

use crate::product::Product;

/// One persisted ledger row.
///
/// Product name, description, unit type and batch are copied from the registry
/// at submission time so the ledger stays readable after a product is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub product_name: String,
    pub description: String,
    pub stock_in: i64,
    pub stock_out: i64,
    pub price: f64,
    pub units: String,
    pub batch_id: String,
    pub date_in: NaiveDate,
    pub time_in: NaiveTime,
    pub date_out: Option<NaiveDate>,
    pub time_out: Option<NaiveTime>,
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: RecordMovement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub product_id: ProductId,
    pub stock_in: i64,
    pub stock_out: i64,
    pub price: f64,
    pub occurred_at: DateTime<Utc>,
}

/// A validated ledger row that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub product_name: String,
    pub description: String,
    pub stock_in: i64,
    pub stock_out: i64,
    pub price: f64,
    pub units: String,
    pub batch_id: String,
    pub date_in: NaiveDate,
    pub time_in: NaiveTime,
    pub date_out: Option<NaiveDate>,
    pub time_out: Option<NaiveTime>,
}

impl NewMovement {
    /// Build a ledger row for `product` from a submitted command.
    ///
    /// Validates quantities and price only; the balance check needs the
    /// product's history and lives in [`crate::stock::check_movement`].
    pub fn for_product(product: &Product, cmd: &RecordMovement) -> DomainResult<Self> {
        if cmd.product_id != product.id {
            return Err(DomainError::validation("product_id mismatch"));
        }
        if cmd.stock_in < 0 {
            return Err(DomainError::validation("stock in cannot be negative"));
        }
        if cmd.stock_out < 0 {
            return Err(DomainError::validation("stock out cannot be negative"));
        }
        if cmd.stock_in == 0 && cmd.stock_out == 0 {
            return Err(DomainError::validation(
                "a movement must record stock in or stock out",
            ));
        }
        if !cmd.price.is_finite() || cmd.price < 0.0 {
            return Err(DomainError::validation(
                "price must be a non-negative number",
            ));
        }

        let date = cmd.occurred_at.date_naive();
        let time = cmd.occurred_at.time();
        let (date_out, time_out) = if cmd.stock_out > 0 {
            (Some(date), Some(time))
        } else {
            (None, None)
        };

        Ok(Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            description: product.description.clone(),
            stock_in: cmd.stock_in,
            stock_out: cmd.stock_out,
            price: cmd.price,
            units: product.unit_type.clone(),
            batch_id: product.batch_id.clone(),
            date_in: date,
            time_in: time,
            date_out,
            time_out,
        })
    }

    /// Attach the store-assigned id.
    pub fn into_movement(self, id: MovementId) -> Movement {
        Movement {
            id,
            product_id: self.product_id,
            product_name: self.product_name,
            description: self.description,
            stock_in: self.stock_in,
            stock_out: self.stock_out,
            price: self.price,
            units: self.units,
            batch_id: self.batch_id,
            date_in: self.date_in,
            time_in: self.time_in,
            date_out: self.date_out,
            time_out: self.time_out,
        }
    }
}
