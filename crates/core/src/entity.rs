//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Directory records (employees, roles, assignments) implement this so
/// tenant stores can key them without knowing their concrete shape.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
