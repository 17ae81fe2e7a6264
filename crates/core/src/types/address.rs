//! Delivery address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DeliveryAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The input is empty or only whitespace.
    #[error("address cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("address must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A free-form delivery address.
///
/// The Order Service accepts a single address line; this type only guarantees
/// it is non-blank and bounded in length. Surrounding whitespace is trimmed.
///
/// ## Examples
///
/// ```
/// use bistro_core::DeliveryAddress;
///
/// let address = DeliveryAddress::parse("  Rua das Flores, 42  ").unwrap();
/// assert_eq!(address.as_str(), "Rua das Flores, 42");
///
/// assert!(DeliveryAddress::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct DeliveryAddress(String);

impl DeliveryAddress {
    /// Maximum length of an address in characters.
    pub const MAX_LENGTH: usize = 300;

    /// Parse a `DeliveryAddress` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(AddressError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DeliveryAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DeliveryAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeliveryAddress> for String {
    fn from(address: DeliveryAddress) -> Self {
        address.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let address = DeliveryAddress::parse("\tAv. Paulista 1000\n").unwrap();
        assert_eq!(address.as_str(), "Av. Paulista 1000");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(DeliveryAddress::parse(""), Err(AddressError::Empty));
        assert_eq!(DeliveryAddress::parse("   "), Err(AddressError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(DeliveryAddress::MAX_LENGTH + 1);
        assert!(matches!(
            DeliveryAddress::parse(&long),
            Err(AddressError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<DeliveryAddress>("\"  \"").is_err());
        let address: DeliveryAddress = serde_json::from_str("\"Rua A, 1\"").unwrap();
        assert_eq!(address.to_string(), "Rua A, 1");
    }
}
