//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity** and are immutable; two values with the
/// same attributes are interchangeable. `Money` and derived ledger outputs
/// (net balances, simplified transfers) are value objects, while recorded
/// expenses and settlements are entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
