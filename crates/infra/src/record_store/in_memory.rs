use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use invadj_adjustments::{
    draft::PreparedAdjustment, AdjustmentReader, EntityLookup, InventoryAdjustment,
    InventoryAdjustmentDraft, ReasonCode, SaveOptions, StoreError, TransactionWriter,
};
use invadj_core::{AccountId, AdjustmentId, EntityCategory, InternalId, ReasonCodeId};

use super::CatalogWriter;

#[derive(Debug, Clone)]
struct EntityRecord {
    category: EntityCategory,
    name: String,
}

#[derive(Debug, Default)]
struct Tables {
    last_id: u64,
    // BTreeMaps keep iteration in id order, so the lowest id wins on duplicate names.
    entities: BTreeMap<InternalId, EntityRecord>,
    reason_codes: BTreeMap<ReasonCodeId, ReasonCode>,
    adjustments: BTreeMap<AdjustmentId, InventoryAdjustment>,
}

impl Tables {
    fn next_id(&mut self) -> Result<InternalId, StoreError> {
        self.last_id += 1;
        Ok(InternalId::new(self.last_id)?)
    }

    fn entity_in(&self, category: EntityCategory, id: InternalId) -> Option<&EntityRecord> {
        self.entities.get(&id).filter(|e| e.category == category)
    }

    fn require(
        &self,
        field: &'static str,
        category: EntityCategory,
        id: InternalId,
    ) -> Result<(), StoreError> {
        match self.entity_in(category, id) {
            Some(_) => Ok(()),
            None => Err(StoreError::InvalidReference { field, id }),
        }
    }

    fn check_references(&self, adjustment: &PreparedAdjustment) -> Result<(), StoreError> {
        if let Some(subsidiary) = adjustment.subsidiary {
            self.require("subsidiary", EntityCategory::Subsidiary, subsidiary.internal())?;
        }
        if let Some(reason_code) = adjustment.reason_code {
            if !self.reason_codes.contains_key(&reason_code) {
                return Err(StoreError::InvalidReference {
                    field: "custbody_ic_adjustment_reason_code",
                    id: reason_code.internal(),
                });
            }
        }
        for line in &adjustment.lines {
            self.require("item", EntityCategory::Item, line.item.internal())?;
            self.require("location", EntityCategory::Location, line.location.internal())?;
            if let Some(department) = line.department {
                self.require("department", EntityCategory::Department, department.internal())?;
            }
        }
        Ok(())
    }
}

/// In-memory record store.
///
/// Intended for tests/dev. All records share one id sequence.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity; names need not be unique.
    pub fn insert_entity(
        &self,
        category: EntityCategory,
        name: impl Into<String>,
    ) -> Result<InternalId, StoreError> {
        let mut tables = self.write()?;
        let id = tables.next_id()?;
        tables.entities.insert(
            id,
            EntityRecord {
                category,
                name: name.into(),
            },
        );
        Ok(id)
    }

    /// Register a reason code posting to `account_id`.
    pub fn insert_reason_code(
        &self,
        name: impl Into<String>,
        account_id: AccountId,
    ) -> Result<ReasonCode, StoreError> {
        let mut tables = self.write()?;
        let id = ReasonCodeId::from(tables.next_id()?);
        let reason = ReasonCode {
            id,
            name: name.into(),
            account_id,
        };
        tables.reason_codes.insert(id, reason.clone());
        Ok(reason)
    }

    /// All saved adjustments in id order.
    pub fn adjustments(&self) -> Vec<InventoryAdjustment> {
        match self.tables.read() {
            Ok(t) => t.adjustments.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityLookup for InMemoryRecordStore {
    async fn find_id_by_name(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<Option<InternalId>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .entities
            .iter()
            .find(|(_, e)| e.category == category && e.name == name)
            .map(|(id, _)| *id))
    }

    async fn find_reason_code(&self, name: &str) -> Result<Option<ReasonCode>, StoreError> {
        let tables = self.read()?;
        Ok(tables.reason_codes.values().find(|r| r.name == name).cloned())
    }
}

#[async_trait]
impl TransactionWriter for InMemoryRecordStore {
    async fn create(
        &self,
        draft: InventoryAdjustmentDraft,
        options: SaveOptions,
    ) -> Result<AdjustmentId, StoreError> {
        let mut prepared = draft.prepare_save(&options)?;

        // Checks and insert happen under one write lock: all or nothing.
        let mut tables = self.write()?;
        tables.check_references(&prepared)?;

        if options.enable_sourcing {
            for line in &mut prepared.lines {
                line.description = tables
                    .entity_in(EntityCategory::Item, line.item.internal())
                    .map(|e| e.name.clone());
            }
        }

        let id = AdjustmentId::from(tables.next_id()?);
        tables
            .adjustments
            .insert(id, prepared.into_saved(id, Utc::now()));
        Ok(id)
    }
}

#[async_trait]
impl AdjustmentReader for InMemoryRecordStore {
    async fn get(&self, id: AdjustmentId) -> Result<Option<InventoryAdjustment>, StoreError> {
        let tables = self.read()?;
        Ok(tables.adjustments.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogWriter for InMemoryRecordStore {
    async fn add_entity(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<InternalId, StoreError> {
        self.insert_entity(category, name)
    }

    async fn add_reason_code(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<ReasonCode, StoreError> {
        self.insert_reason_code(name, account_id)
    }
}
