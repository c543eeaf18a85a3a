//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a registered product.
///
/// Chosen by the user at registration time (e.g. a SKU or internal code), so it
/// is a string key rather than a generated id. Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("product id cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

/// Identifier of a ledger row (assigned by the store, auto-increment).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(pub i64);

impl MovementId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MovementId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::validation(format!("MovementId: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_is_trimmed() {
        let id = ProductId::new("  W-001 ").unwrap();
        assert_eq!(id.as_str(), "W-001");
    }

    #[test]
    fn blank_product_id_is_rejected() {
        assert!(matches!(ProductId::new("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn product_id_deserialization_validates() {
        let ok: ProductId = serde_json::from_str("\"W-001\"").unwrap();
        assert_eq!(ok.as_str(), "W-001");
        assert!(serde_json::from_str::<ProductId>("\"  \"").is_err());
    }

    #[test]
    fn movement_id_parses_integers_only() {
        assert_eq!("42".parse::<MovementId>().unwrap(), MovementId(42));
        assert!("abc".parse::<MovementId>().is_err());
    }
}
