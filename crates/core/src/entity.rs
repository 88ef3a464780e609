//! Entity trait: identity that survives edits.
//!
//! A flow keeps its identifier for its whole lifetime; only its attributes
//! (the name, server-assigned bookkeeping) change between saves.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// True when `other` is a (possibly newer) revision of the same entity.
    fn is_same_entity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
