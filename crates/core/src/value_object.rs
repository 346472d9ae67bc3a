//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A roll number is a
/// value object; an inventory row (keyed by product name) is an entity.
///
/// ```ignore
/// let a: RollNumber = "22BCS001".parse()?;
/// let b: RollNumber = " 22BCS001 ".parse()?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
