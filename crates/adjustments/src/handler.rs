//! The adjustment request flow: validate, resolve names, build, save.
//!
//! Every function is stateless and takes the store ports it needs as
//! arguments, so the flow runs the same against any backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use invadj_core::{
    AccountId, AdjustmentId, DepartmentId, EntityCategory, InternalId, ItemId, LocationId,
    ReasonCodeId, SubsidiaryId,
};

use crate::draft::{InventoryAdjustmentDraft, SaveOptions};
use crate::error::AdjustmentError;
use crate::ports::{EntityLookup, ReasonCode, StoreError, TransactionWriter};
use crate::request::{AdjustmentRequest, ValidatedRequest};
use crate::result::AdjustmentResult;

/// Internal ids for every name carried by a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifiers {
    pub reason_code: ReasonCodeId,
    pub account: AccountId,
    pub department: DepartmentId,
    pub subsidiary: SubsidiaryId,
    pub location: LocationId,
    pub item: ItemId,
}

/// Look up a reason code; one round trip yields both its id and its account.
pub async fn resolve_reason_code<L>(lookup: &L, name: &str) -> Result<ReasonCode, AdjustmentError>
where
    L: EntityLookup + ?Sized,
{
    lookup
        .find_reason_code(name)
        .await?
        .ok_or_else(|| AdjustmentError::reason_code_not_found(name))
}

/// Look up the id of the entity in `category` named exactly `name`.
pub async fn resolve_id_from_name<L>(
    lookup: &L,
    category: EntityCategory,
    name: &str,
) -> Result<InternalId, AdjustmentError>
where
    L: EntityLookup + ?Sized,
{
    lookup
        .find_id_by_name(category, name)
        .await?
        .ok_or_else(|| AdjustmentError::not_found(category, name))
}

/// Resolve all names in a fixed order, stopping at the first miss.
pub async fn resolve_identifiers<L>(
    lookup: &L,
    request: &ValidatedRequest<'_>,
) -> Result<ResolvedIdentifiers, AdjustmentError>
where
    L: EntityLookup + ?Sized,
{
    let reason_code = resolve_reason_code(lookup, request.reason_code).await?;
    let department =
        resolve_id_from_name(lookup, EntityCategory::Department, request.department).await?;
    let subsidiary =
        resolve_id_from_name(lookup, EntityCategory::Subsidiary, request.subsidiary).await?;
    let location = resolve_id_from_name(lookup, EntityCategory::Location, request.location).await?;
    let item = resolve_id_from_name(lookup, EntityCategory::Item, request.item).await?;

    Ok(ResolvedIdentifiers {
        reason_code: reason_code.id,
        account: reason_code.account_id,
        department: department.into(),
        subsidiary: subsidiary.into(),
        location: location.into(),
        item: item.into(),
    })
}

/// Build a single-line adjustment from resolved ids and save it.
pub async fn create_adjustment<W>(
    writer: &W,
    resolved: &ResolvedIdentifiers,
    trandate: NaiveDate,
    adjust_qty_by: Decimal,
    options: SaveOptions,
) -> Result<AdjustmentId, AdjustmentError>
where
    W: TransactionWriter + ?Sized,
{
    let draft = build_draft(resolved, trandate, adjust_qty_by).map_err(StoreError::from)?;
    Ok(writer.create(draft, options).await?)
}

fn build_draft(
    resolved: &ResolvedIdentifiers,
    trandate: NaiveDate,
    adjust_qty_by: Decimal,
) -> invadj_core::DomainResult<InventoryAdjustmentDraft> {
    let mut draft = InventoryAdjustmentDraft::new();
    draft.set_subsidiary(resolved.subsidiary);
    draft.set_reason_code(resolved.reason_code);
    draft.set_account(resolved.account);
    draft.set_trandate(trandate);

    draft.select_new_line()?;
    draft.set_current_line_item(resolved.item)?;
    draft.set_current_line_location(resolved.location)?;
    draft.set_current_line_adjust_qty_by(adjust_qty_by)?;
    draft.set_current_line_department(resolved.department)?;
    draft.commit_line()?;

    Ok(draft)
}

/// Run one request end to end. Never fails: errors become a `failed` result
/// and are logged with their title.
pub async fn handle_adjustment<L, W>(
    lookup: &L,
    writer: &W,
    request: &AdjustmentRequest,
    options: SaveOptions,
) -> AdjustmentResult
where
    L: EntityLookup + ?Sized,
    W: TransactionWriter + ?Sized,
{
    report_outcome(process(lookup, writer, request, options).await)
}

/// Convert an attempt's outcome into the caller-facing result, logging failures.
pub fn report_outcome(outcome: Result<AdjustmentId, AdjustmentError>) -> AdjustmentResult {
    if let Err(e) = &outcome {
        warn!(title = e.title(), message = %e, "inventory adjustment failed");
    }
    AdjustmentResult::from(outcome)
}

async fn process<L, W>(
    lookup: &L,
    writer: &W,
    request: &AdjustmentRequest,
    options: SaveOptions,
) -> Result<AdjustmentId, AdjustmentError>
where
    L: EntityLookup + ?Sized,
    W: TransactionWriter + ?Sized,
{
    let request = request.validate()?;
    let resolved = resolve_identifiers(lookup, &request).await?;
    create_adjustment(writer, &resolved, request.trandate, request.adjust_qty_by, options).await
}
