use std::sync::Arc;

use anyhow::Context;

use invadj_adjustments::{
    handle_adjustment, AdjustmentReader, AdjustmentRequest, AdjustmentResult, EntityLookup,
    InventoryAdjustment, SaveOptions, StoreError, TransactionWriter,
};
use invadj_core::AdjustmentId;
use invadj_infra::{CatalogWriter, InMemoryRecordStore, PostgresRecordStore, SeedCatalog};

use crate::config::{ApiConfig, StoreBackend};

/// Store ports and save policy shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    lookup: Arc<dyn EntityLookup>,
    writer: Arc<dyn TransactionWriter>,
    reader: Arc<dyn AdjustmentReader>,
    save_options: SaveOptions,
}

impl AppServices {
    pub fn new(
        lookup: Arc<dyn EntityLookup>,
        writer: Arc<dyn TransactionWriter>,
        reader: Arc<dyn AdjustmentReader>,
        save_options: SaveOptions,
    ) -> Self {
        Self {
            lookup,
            writer,
            reader,
            save_options,
        }
    }

    /// All three ports served by one in-memory store (dev/test).
    pub fn in_memory(store: Arc<InMemoryRecordStore>, save_options: SaveOptions) -> Self {
        Self::new(store.clone(), store.clone(), store, save_options)
    }

    pub fn postgres(store: Arc<PostgresRecordStore>, save_options: SaveOptions) -> Self {
        Self::new(store.clone(), store.clone(), store, save_options)
    }

    pub fn save_options(&self) -> SaveOptions {
        self.save_options
    }

    pub async fn submit_adjustment(&self, request: &AdjustmentRequest) -> AdjustmentResult {
        handle_adjustment(&*self.lookup, &*self.writer, request, self.save_options).await
    }

    pub async fn get_adjustment(
        &self,
        id: AdjustmentId,
    ) -> Result<Option<InventoryAdjustment>, StoreError> {
        self.reader.get(id).await
    }
}

/// Wire the configured backend, creating the schema and applying the seed
/// catalog when configured.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let seed = match &config.seed_file {
        Some(path) => Some(SeedCatalog::load(path)?),
        None => None,
    };

    match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("using in-memory record store; data is lost on restart");
            let store = Arc::new(InMemoryRecordStore::new());
            apply_seed(seed.as_ref(), &*store).await?;
            Ok(AppServices::in_memory(store, config.save_options))
        }
        StoreBackend::Postgres { database_url } => {
            let store = PostgresRecordStore::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to create schema")?;
            let store = Arc::new(store);
            apply_seed(seed.as_ref(), &*store).await?;
            Ok(AppServices::postgres(store, config.save_options))
        }
    }
}

async fn apply_seed<W>(seed: Option<&SeedCatalog>, writer: &W) -> anyhow::Result<()>
where
    W: CatalogWriter + ?Sized,
{
    if let Some(seed) = seed {
        seed.apply(writer)
            .await
            .context("failed to apply seed catalog")?;
    }
    Ok(())
}
