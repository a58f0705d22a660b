//! Records the store keys by an integer id.

/// A stored record with a store-assigned key.
pub trait Entity {
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// False until the store has assigned a key.
    fn is_persisted(&self) -> bool;
}
