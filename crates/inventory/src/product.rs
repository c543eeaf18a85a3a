use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ProductId};

/// A registered product (one row of the registry).
///
/// Immutable once registered; the only lifecycle change is deletion by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub unit_type: String,
    pub batch_id: String,
    pub registered_on: NaiveDate,
    pub total_units: Option<i64>,
    pub expires_on: Option<NaiveDate>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: RegisterProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub unit_type: String,
    pub batch_id: String,
    pub registered_on: NaiveDate,
    pub total_units: Option<i64>,
    pub expires_on: Option<NaiveDate>,
}

impl RegisterProduct {
    /// Validate the command and produce the product record to persist.
    ///
    /// Uniqueness of the id is a storage concern and is checked on insert.
    pub fn into_product(self) -> DomainResult<Product> {
        let name = required(&self.name, "name")?;
        let unit_type = required(&self.unit_type, "unit type")?;

        if let Some(units) = self.total_units {
            if units < 0 {
                return Err(DomainError::validation("total units cannot be negative"));
            }
        }

        if let Some(expires_on) = self.expires_on {
            if expires_on < self.registered_on {
                return Err(DomainError::validation(
                    "expiration date cannot precede the registration date",
                ));
            }
        }

        Ok(Product {
            id: self.id,
            name,
            description: self.description.trim().to_string(),
            unit_type,
            batch_id: self.batch_id.trim().to_string(),
            registered_on: self.registered_on,
            total_units: self.total_units,
            expires_on: self.expires_on,
        })
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> RegisterProduct {
        RegisterProduct {
            id: ProductId::new("W-001").unwrap(),
            name: "Widget".to_string(),
            description: "Standard widget".to_string(),
            unit_type: "pcs".to_string(),
            batch_id: "B1".to_string(),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_units: None,
            expires_on: None,
        }
    }

    #[test]
    fn register_product_trims_text_fields() {
        let mut cmd = widget();
        cmd.name = "  Widget  ".to_string();
        cmd.batch_id = " B1 ".to_string();

        let product = cmd.into_product().unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.batch_id, "B1");
        assert_eq!(product.unit_type, "pcs");
    }

    #[test]
    fn register_product_rejects_blank_name() {
        let mut cmd = widget();
        cmd.name = "   ".to_string();

        match cmd.into_product().unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("name")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn register_product_rejects_blank_unit_type() {
        let mut cmd = widget();
        cmd.unit_type = String::new();

        assert!(matches!(cmd.into_product(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn register_product_rejects_negative_total_units() {
        let mut cmd = widget();
        cmd.total_units = Some(-1);

        assert!(matches!(cmd.into_product(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn register_product_rejects_expiration_before_registration() {
        let mut cmd = widget();
        cmd.expires_on = NaiveDate::from_ymd_opt(2024, 2, 1);

        assert!(matches!(cmd.into_product(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn register_product_keeps_optional_fields() {
        let mut cmd = widget();
        cmd.total_units = Some(500);
        cmd.expires_on = NaiveDate::from_ymd_opt(2025, 3, 1);

        let product = cmd.into_product().unwrap();
        assert_eq!(product.total_units, Some(500));
        assert_eq!(product.expires_on, NaiveDate::from_ymd_opt(2025, 3, 1));
    }
}
