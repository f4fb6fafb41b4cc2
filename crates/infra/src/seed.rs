//! Catalog seeding from a JSON document.
//!
//! ```json
//! {
//!   "departments": ["Warehouse"],
//!   "subsidiaries": ["Main"],
//!   "locations": ["Dock-A"],
//!   "items": ["SKU-100"],
//!   "reasonCodes": [{ "name": "CYCLE_COUNT", "account": 600 }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use invadj_adjustments::StoreError;
use invadj_core::{AccountId, EntityCategory};

use crate::record_store::CatalogWriter;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReasonCode {
    pub name: String,
    pub account: AccountId,
}

/// Records to register before serving requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCatalog {
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub subsidiaries: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub reason_codes: Vec<SeedReasonCode>,
}

impl SeedCatalog {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn entities(&self) -> impl Iterator<Item = (EntityCategory, &str)> {
        tagged(EntityCategory::Department, &self.departments)
            .chain(tagged(EntityCategory::Subsidiary, &self.subsidiaries))
            .chain(tagged(EntityCategory::Location, &self.locations))
            .chain(tagged(EntityCategory::Item, &self.items))
    }

    /// Register every record; returns how many were written.
    pub async fn apply<W>(&self, writer: &W) -> Result<usize, SeedError>
    where
        W: CatalogWriter + ?Sized,
    {
        let mut written = 0;
        for (category, name) in self.entities() {
            writer.add_entity(category, name).await?;
            written += 1;
        }
        for reason in &self.reason_codes {
            writer.add_reason_code(&reason.name, reason.account).await?;
            written += 1;
        }
        info!(records = written, "seed catalog applied");
        Ok(written)
    }
}

fn tagged(category: EntityCategory, names: &[String]) -> impl Iterator<Item = (EntityCategory, &str)> {
    names.iter().map(move |n| (category, n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRecordStore;
    use invadj_adjustments::EntityLookup;

    const CATALOG: &str = r#"{
        "departments": ["Warehouse"],
        "subsidiaries": ["Main"],
        "locations": ["Dock-A", "Dock-B"],
        "items": ["SKU-100"],
        "reasonCodes": [{ "name": "CYCLE_COUNT", "account": 600 }]
    }"#;

    #[tokio::test]
    async fn catalog_is_loaded_into_the_store() {
        let catalog = SeedCatalog::from_json(CATALOG).unwrap();
        let store = InMemoryRecordStore::new();
        assert_eq!(catalog.apply(&store).await.unwrap(), 6);

        let dock_b = store
            .find_id_by_name(EntityCategory::Location, "Dock-B")
            .await
            .unwrap();
        assert!(dock_b.is_some());

        let reason = store.find_reason_code("CYCLE_COUNT").await.unwrap().unwrap();
        assert_eq!(reason.account_id.get(), 600);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let catalog = SeedCatalog::from_json(r#"{"items": ["SKU-1"]}"#).unwrap();
        assert_eq!(catalog.items, vec!["SKU-1".to_string()]);
        assert!(catalog.reason_codes.is_empty());
    }

    #[test]
    fn zero_account_is_rejected() {
        let err = SeedCatalog::from_json(r#"{"reasonCodes": [{"name": "X", "account": 0}]}"#)
            .unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = SeedCatalog::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
