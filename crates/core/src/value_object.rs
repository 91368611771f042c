//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - two instances
/// with the same attribute values are the same thing. To "modify" one, create
/// a new one. `Money` is the canonical example in this workspace; `Product`
/// deliberately is not (it is an [`crate::Entity`] keyed by `ProductId`, so
/// two listings with identical display fields stay distinct).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
