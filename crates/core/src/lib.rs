//! Shared primitives for the stock ledger: identifiers, the entity trait and
//! the domain error type. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{MovementId, ProductId};
