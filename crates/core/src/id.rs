//! Strongly-typed text identifiers used across the ledger.
//!
//! Each identifier is trimmed on construction and must not be empty. Parsing an
//! empty value fails with [`DomainError::MissingRequiredField`] naming the field,
//! for form input and for serde.
//!
//! Rows already on disk can opt out per column through [`stored`].

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Student roll number (e.g. `22BCS001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollNumber(String);

/// Student display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentName(String);

/// Product name; the unique key of an inventory row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

macro_rules! impl_text_newtype {
    ($t:ty, $field:literal) => {
        impl $t {
            /// Build from raw input, trimming whitespace.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::MissingRequiredField($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStored for $t {
            fn from_stored(raw: &str) -> Self {
                Self(raw.trim().to_string())
            }
        }

        impl ValueObject for $t {}

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl PartialEq<str> for $t {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $t {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Identifiers that can be rebuilt from a stored cell without validation.
pub trait FromStored {
    fn from_stored(raw: &str) -> Self;
}

/// Serde `deserialize_with` helper for identifier columns of persisted rows.
///
/// Logs written before input was validated can hold blank cells. Those load as
/// empty identifiers so one old row does not make the whole relation unreadable.
/// An empty identifier never equals one built with `new`.
pub mod stored {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStored,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(T::from_stored(&raw))
    }
}

impl_text_newtype!(RollNumber, "roll number");
impl_text_newtype!(StudentName, "student name");
impl_text_newtype!(ProductName, "product");
