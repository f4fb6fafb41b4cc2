//! Entity categories a name lookup can be scoped to.

use serde::{Deserialize, Serialize};

/// Classification of a lookup target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Department,
    Item,
    Subsidiary,
    Location,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Department,
        EntityCategory::Item,
        EntityCategory::Subsidiary,
        EntityCategory::Location,
    ];

    /// Stable lowercase name, also used as the storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Department => "department",
            EntityCategory::Item => "item",
            EntityCategory::Subsidiary => "subsidiary",
            EntityCategory::Location => "location",
        }
    }
}

impl core::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EntityCategory {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::DomainError::validation(format!("unknown entity category: {s}")))
    }
}
