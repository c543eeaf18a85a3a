//! Entity trait: records that are looked up and deleted by key.

/// Anything stored under a stable key (registry products, ledger rows).
pub trait Entity {
    /// Strongly-typed key.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the key this record is stored under.
    fn id(&self) -> &Self::Id;

    fn has_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
