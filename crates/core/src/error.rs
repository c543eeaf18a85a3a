//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation and
/// stock rules). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank name, negative quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stock-out asked for more than the product currently holds.
    #[error("insufficient stock: cannot remove {attempted} units, only {available} available")]
    InsufficientStock { attempted: i64, available: i64 },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(attempted: i64, available: i64) -> Self {
        Self::InsufficientStock {
            attempted,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_both_figures() {
        let err = DomainError::insufficient_stock(20, 15);
        let msg = err.to_string();
        assert!(msg.contains("20"));
        assert!(msg.contains("15"));
    }
}
