//! Strongly-typed identifiers used across the domain.
//!
//! Records are addressed by positive integer internal ids assigned by the
//! record store. Each record kind gets its own newtype so a location id can
//! never be passed where an item id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Untyped internal id, as returned by a category-generic lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct InternalId(u64);

/// Identifier of a department record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(InternalId);

/// Identifier of a subsidiary record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsidiaryId(InternalId);

/// Identifier of a location record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(InternalId);

/// Identifier of an inventory item record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(InternalId);

/// Identifier of an adjustment reason-code catalog entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCodeId(InternalId);

/// Identifier of a financial (expense/asset) account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(InternalId);

/// Identifier of a saved inventory adjustment transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentId(InternalId);

impl InternalId {
    /// Wrap a raw id. Zero is reserved and rejected.
    pub fn new(raw: u64) -> Result<Self, DomainError> {
        if raw == 0 {
            return Err(DomainError::invalid_id("internal id must be positive"));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for InternalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for InternalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("InternalId: {e}")))?;
        Self::new(raw)
    }
}

impl TryFrom<u64> for InternalId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InternalId> for u64 {
    fn from(value: InternalId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for InternalId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let raw = u64::try_from(value)
            .map_err(|_| DomainError::invalid_id(format!("InternalId: negative value {value}")))?;
        Self::new(raw)
    }
}

macro_rules! impl_internal_id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(raw: u64) -> Result<Self, DomainError> {
                InternalId::new(raw)
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))
            }

            pub fn internal(&self) -> InternalId {
                self.0
            }

            pub fn get(&self) -> u64 {
                self.0.get()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<InternalId> for $t {
            fn from(value: InternalId) -> Self {
                Self(value)
            }
        }

        impl From<$t> for InternalId {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = InternalId::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(id))
            }
        }
    };
}

impl_internal_id_newtype!(DepartmentId, "DepartmentId");
impl_internal_id_newtype!(SubsidiaryId, "SubsidiaryId");
impl_internal_id_newtype!(LocationId, "LocationId");
impl_internal_id_newtype!(ItemId, "ItemId");
impl_internal_id_newtype!(ReasonCodeId, "ReasonCodeId");
impl_internal_id_newtype!(AccountId, "AccountId");
impl_internal_id_newtype!(AdjustmentId, "AdjustmentId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_valid_id() {
        assert!(InternalId::new(0).is_err());
        assert!(ItemId::new(0).is_err());
        assert!("0".parse::<LocationId>().is_err());
    }

    #[test]
    fn ids_parse_and_display_as_plain_integers() {
        let id: AdjustmentId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<AdjustmentId>().is_err());
        assert!("-3".parse::<AdjustmentId>().is_err());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = AccountId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        assert!(serde_json::from_str::<AccountId>("0").is_err());
    }

    #[test]
    fn negative_database_ids_are_rejected() {
        assert!(InternalId::try_from(-1_i64).is_err());
        assert_eq!(InternalId::try_from(9_i64).unwrap().get(), 9);
    }
}
