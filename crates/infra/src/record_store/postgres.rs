//! Postgres-backed record store.
//!
//! Entities of every category share one `entities` table keyed by a
//! `BIGSERIAL` id; reason codes and adjustments have their own tables.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `Rejected` |
//! | Database (check constraint violation) | `23514` | `Rejected` |
//! | Database (other) | Any other | `Unavailable` |
//! | Pool/IO/other | N/A | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use invadj_adjustments::{
    AdjustmentReader, EntityLookup, InventoryAdjustment, InventoryAdjustmentDraft,
    InventoryAdjustmentLine, ReasonCode, SaveOptions, StoreError, TransactionWriter,
};
use invadj_core::{AccountId, AdjustmentId, EntityCategory, InternalId, ReasonCodeId};

use super::CatalogWriter;

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS entities (
        id BIGSERIAL PRIMARY KEY,
        category TEXT NOT NULL,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS entities_category_name_idx ON entities (category, name, id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reason_codes (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        account_id BIGINT NOT NULL CHECK (account_id > 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_adjustments (
        id BIGSERIAL PRIMARY KEY,
        subsidiary_id BIGINT REFERENCES entities (id),
        reason_code_id BIGINT REFERENCES reason_codes (id),
        account_id BIGINT,
        trandate DATE,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_adjustment_lines (
        adjustment_id BIGINT NOT NULL REFERENCES inventory_adjustments (id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        item_id BIGINT NOT NULL REFERENCES entities (id),
        location_id BIGINT NOT NULL REFERENCES entities (id),
        department_id BIGINT REFERENCES entities (id),
        adjust_qty_by NUMERIC NOT NULL,
        description TEXT,
        PRIMARY KEY (adjustment_id, line_no)
    )
    "#,
];

/// Postgres-backed record store.
///
/// `create` runs inside one SQL transaction; a failed save leaves no rows.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    /// Create a new PostgresRecordStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn check_entity(
        tx: &mut Transaction<'_, Postgres>,
        field: &'static str,
        category: EntityCategory,
        id: InternalId,
    ) -> Result<i64, StoreError> {
        let raw = db_id(id)?;
        let found = sqlx::query("SELECT 1 FROM entities WHERE id = $1 AND category = $2")
            .bind(raw)
            .bind(category.as_str())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("check_entity", e))?;
        match found {
            Some(_) => Ok(raw),
            None => Err(StoreError::InvalidReference { field, id }),
        }
    }

    async fn load_lines(
        &self,
        adjustment_id: i64,
    ) -> Result<Vec<InventoryAdjustmentLine>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT item_id, location_id, department_id, adjust_qty_by, description
            FROM inventory_adjustment_lines
            WHERE adjustment_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(adjustment_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_lines", e))?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let department: Option<i64> = row.try_get("department_id").map_err(decode_error)?;
            lines.push(InventoryAdjustmentLine {
                item: InternalId::try_from(row.try_get::<i64, _>("item_id").map_err(decode_error)?)?
                    .into(),
                location: InternalId::try_from(
                    row.try_get::<i64, _>("location_id").map_err(decode_error)?,
                )?
                .into(),
                department: department
                    .map(InternalId::try_from)
                    .transpose()?
                    .map(Into::into),
                adjust_qty_by: row.try_get("adjust_qty_by").map_err(decode_error)?,
                description: row.try_get("description").map_err(decode_error)?,
            });
        }
        Ok(lines)
    }
}

#[async_trait]
impl EntityLookup for PostgresRecordStore {
    #[instrument(skip(self), err)]
    async fn find_id_by_name(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<Option<InternalId>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id FROM entities
            WHERE category = $1 AND name = $2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(category.as_str())
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_id_by_name", e))?;

        match row {
            Some(row) => {
                let id: i64 = row.try_get("id").map_err(decode_error)?;
                Ok(Some(InternalId::try_from(id)?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn find_reason_code(&self, name: &str) -> Result<Option<ReasonCode>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, account_id FROM reason_codes
            WHERE name = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_reason_code", e))?;

        match row {
            Some(row) => Ok(Some(ReasonCode {
                id: InternalId::try_from(row.try_get::<i64, _>("id").map_err(decode_error)?)?
                    .into(),
                name: row.try_get("name").map_err(decode_error)?,
                account_id: InternalId::try_from(
                    row.try_get::<i64, _>("account_id").map_err(decode_error)?,
                )?
                .into(),
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TransactionWriter for PostgresRecordStore {
    #[instrument(skip(self, draft), err)]
    async fn create(
        &self,
        draft: InventoryAdjustmentDraft,
        options: SaveOptions,
    ) -> Result<AdjustmentId, StoreError> {
        let prepared = draft.prepare_save(&options)?;

        // Dropping `tx` without commit rolls everything back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let subsidiary = match prepared.subsidiary {
            Some(s) => Some(
                Self::check_entity(&mut tx, "subsidiary", EntityCategory::Subsidiary, s.internal())
                    .await?,
            ),
            None => None,
        };
        let reason_code = prepared.reason_code.map(|r| db_id(r.internal())).transpose()?;
        let account = prepared.account.map(|a| db_id(a.internal())).transpose()?;

        let row = sqlx::query(
            r#"
            INSERT INTO inventory_adjustments
                (subsidiary_id, reason_code_id, account_id, trandate, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(subsidiary)
        .bind(reason_code)
        .bind(account)
        .bind(prepared.trandate)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_adjustment", e))?;
        let adjustment_id: i64 = row.try_get("id").map_err(decode_error)?;

        for (line_no, line) in prepared.lines.iter().enumerate() {
            let item =
                Self::check_entity(&mut tx, "item", EntityCategory::Item, line.item.internal())
                    .await?;
            let location = Self::check_entity(
                &mut tx,
                "location",
                EntityCategory::Location,
                line.location.internal(),
            )
            .await?;
            let department = match line.department {
                Some(d) => Some(
                    Self::check_entity(
                        &mut tx,
                        "department",
                        EntityCategory::Department,
                        d.internal(),
                    )
                    .await?,
                ),
                None => None,
            };

            let description: Option<String> = if options.enable_sourcing {
                sqlx::query("SELECT name FROM entities WHERE id = $1")
                    .bind(item)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("source_description", e))?
                    .map(|r| r.try_get::<String, _>("name"))
                    .transpose()
                    .map_err(decode_error)?
            } else {
                line.description.clone()
            };

            sqlx::query(
                r#"
                INSERT INTO inventory_adjustment_lines
                    (adjustment_id, line_no, item_id, location_id, department_id, adjust_qty_by, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(adjustment_id)
            .bind(line_no as i32)
            .bind(item)
            .bind(location)
            .bind(department)
            .bind(line.adjust_qty_by)
            .bind(description)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_line", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        Ok(InternalId::try_from(adjustment_id)?.into())
    }
}

#[async_trait]
impl AdjustmentReader for PostgresRecordStore {
    #[instrument(skip(self), err)]
    async fn get(&self, id: AdjustmentId) -> Result<Option<InventoryAdjustment>, StoreError> {
        // Ids beyond BIGINT range cannot exist.
        let Ok(raw) = i64::try_from(id.get()) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT subsidiary_id, reason_code_id, account_id, trandate, created_at
            FROM inventory_adjustments
            WHERE id = $1
            "#,
        )
        .bind(raw)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_adjustment", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let subsidiary: Option<i64> = row.try_get("subsidiary_id").map_err(decode_error)?;
        let reason_code: Option<i64> = row.try_get("reason_code_id").map_err(decode_error)?;
        let account: Option<i64> = row.try_get("account_id").map_err(decode_error)?;
        let trandate: Option<NaiveDate> = row.try_get("trandate").map_err(decode_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_error)?;

        Ok(Some(InventoryAdjustment {
            id,
            subsidiary: subsidiary.map(InternalId::try_from).transpose()?.map(Into::into),
            reason_code: reason_code.map(InternalId::try_from).transpose()?.map(Into::into),
            account: account.map(InternalId::try_from).transpose()?.map(Into::into),
            trandate,
            lines: self.load_lines(raw).await?,
            created_at,
        }))
    }
}

#[async_trait]
impl CatalogWriter for PostgresRecordStore {
    async fn add_entity(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<InternalId, StoreError> {
        let row = sqlx::query("INSERT INTO entities (category, name) VALUES ($1, $2) RETURNING id")
            .bind(category.as_str())
            .bind(name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_entity", e))?;
        let id: i64 = row.try_get("id").map_err(decode_error)?;
        Ok(InternalId::try_from(id)?)
    }

    async fn add_reason_code(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<ReasonCode, StoreError> {
        let row = sqlx::query(
            "INSERT INTO reason_codes (name, account_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(db_id(account_id.internal())?)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_reason_code", e))?;
        let id: i64 = row.try_get("id").map_err(decode_error)?;
        Ok(ReasonCode {
            id: ReasonCodeId::from(InternalId::try_from(id)?),
            name: name.to_string(),
            account_id,
        })
    }
}

fn db_id(id: InternalId) -> Result<i64, StoreError> {
    i64::try_from(id.get())
        .map_err(|_| StoreError::Rejected(format!("id {id} exceeds the database id range")))
}

fn decode_error(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("failed to decode row: {e}"))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23503") | Some("23514") => {
                StoreError::Rejected(format!("{operation}: {}", db_err.message()))
            }
            _ => StoreError::Unavailable(format!("{operation}: {}", db_err.message())),
        },
        _ => StoreError::Unavailable(format!("{operation}: {error}")),
    }
}
