//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object has no key of its own; it lives inside the row of the entity
/// that owns it and is replaced wholesale rather than edited in place. Two
/// value objects with the same attributes are equal.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {
    /// Whether every attribute is unset.
    fn is_blank(&self) -> bool;
}
