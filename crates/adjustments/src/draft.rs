//! Inventory adjustment records: the dynamic draft and the saved form.
//!
//! A draft is edited the way the ERP edits dynamic records: header fields are
//! set one by one, and sublist lines are built by selecting a new line,
//! setting its fields, then committing it. Any step can be rejected; a
//! rejected draft is simply dropped.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invadj_core::{
    AccountId, AdjustmentId, DepartmentId, DomainError, DomainResult, ItemId, LocationId,
    ReasonCodeId, SubsidiaryId,
};

/// Flags applied when a draft is saved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Let the store fill dependent fields (line descriptions from item names).
    pub enable_sourcing: bool,
    /// Skip the mandatory-field check.
    pub ignore_mandatory_fields: bool,
}

impl SaveOptions {
    /// Sourcing off, mandatory-field check off.
    pub fn relaxed() -> Self {
        Self {
            enable_sourcing: false,
            ignore_mandatory_fields: true,
        }
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// One committed line of the `inventory` sublist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAdjustmentLine {
    pub item: ItemId,
    pub location: LocationId,
    pub department: Option<DepartmentId>,
    pub adjust_qty_by: Decimal,
    /// Filled by sourcing only.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PendingLine {
    item: Option<ItemId>,
    location: Option<LocationId>,
    department: Option<DepartmentId>,
    adjust_qty_by: Option<Decimal>,
}

/// An inventory adjustment under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryAdjustmentDraft {
    subsidiary: Option<SubsidiaryId>,
    reason_code: Option<ReasonCodeId>,
    account: Option<AccountId>,
    trandate: Option<NaiveDate>,
    lines: Vec<InventoryAdjustmentLine>,
    current_line: Option<PendingLine>,
}

impl InventoryAdjustmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subsidiary(&mut self, subsidiary: SubsidiaryId) {
        self.subsidiary = Some(subsidiary);
    }

    pub fn set_reason_code(&mut self, reason_code: ReasonCodeId) {
        self.reason_code = Some(reason_code);
    }

    pub fn set_account(&mut self, account: AccountId) {
        self.account = Some(account);
    }

    pub fn set_trandate(&mut self, trandate: NaiveDate) {
        self.trandate = Some(trandate);
    }

    /// Start a new `inventory` line. Only one line can be open at a time.
    pub fn select_new_line(&mut self) -> DomainResult<()> {
        if self.current_line.is_some() {
            return Err(DomainError::invalid_line(
                "a line is already selected; commit or cancel it first",
            ));
        }
        self.current_line = Some(PendingLine::default());
        Ok(())
    }

    /// Discard the open line, if any.
    pub fn cancel_line(&mut self) {
        self.current_line = None;
    }

    pub fn set_current_line_item(&mut self, item: ItemId) -> DomainResult<()> {
        self.current_line_mut()?.item = Some(item);
        Ok(())
    }

    pub fn set_current_line_location(&mut self, location: LocationId) -> DomainResult<()> {
        self.current_line_mut()?.location = Some(location);
        Ok(())
    }

    pub fn set_current_line_department(&mut self, department: DepartmentId) -> DomainResult<()> {
        self.current_line_mut()?.department = Some(department);
        Ok(())
    }

    pub fn set_current_line_adjust_qty_by(&mut self, qty: Decimal) -> DomainResult<()> {
        self.current_line_mut()?.adjust_qty_by = Some(qty);
        Ok(())
    }

    /// Validate the open line and append it to the sublist.
    pub fn commit_line(&mut self) -> DomainResult<()> {
        let pending = self
            .current_line
            .as_ref()
            .ok_or_else(|| DomainError::invalid_line("no line selected"))?;

        let item = pending
            .item
            .ok_or_else(|| DomainError::invalid_line("line is missing item"))?;
        let location = pending
            .location
            .ok_or_else(|| DomainError::invalid_line("line is missing location"))?;
        let adjust_qty_by = pending
            .adjust_qty_by
            .ok_or_else(|| DomainError::invalid_line("line is missing adjustqtyby"))?;

        self.lines.push(InventoryAdjustmentLine {
            item,
            location,
            department: pending.department,
            adjust_qty_by,
            description: None,
        });
        self.current_line = None;
        Ok(())
    }

    pub fn lines(&self) -> &[InventoryAdjustmentLine] {
        &self.lines
    }

    pub fn has_open_line(&self) -> bool {
        self.current_line.is_some()
    }

    /// Header fields and sublist requirements a save enforces unless told not to.
    pub fn check_mandatory_fields(&self) -> DomainResult<()> {
        if self.subsidiary.is_none() {
            return Err(DomainError::MissingMandatoryField("subsidiary"));
        }
        if self.account.is_none() {
            return Err(DomainError::MissingMandatoryField("account"));
        }
        if self.trandate.is_none() {
            return Err(DomainError::MissingMandatoryField("trandate"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::MissingMandatoryField("inventory"));
        }
        Ok(())
    }

    /// Freeze the draft for persistence.
    ///
    /// An open (uncommitted) line always blocks the save; the mandatory-field
    /// check runs unless `options.ignore_mandatory_fields` is set.
    pub fn prepare_save(self, options: &SaveOptions) -> DomainResult<PreparedAdjustment> {
        if self.current_line.is_some() {
            return Err(DomainError::invalid_line("line selected but not committed"));
        }
        if !options.ignore_mandatory_fields {
            self.check_mandatory_fields()?;
        }
        Ok(PreparedAdjustment {
            subsidiary: self.subsidiary,
            reason_code: self.reason_code,
            account: self.account,
            trandate: self.trandate,
            lines: self.lines,
        })
    }

    fn current_line_mut(&mut self) -> DomainResult<&mut PendingLine> {
        self.current_line
            .as_mut()
            .ok_or_else(|| DomainError::invalid_line("no line selected"))
    }
}

/// A draft that passed save checks and is waiting for an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAdjustment {
    pub subsidiary: Option<SubsidiaryId>,
    pub reason_code: Option<ReasonCodeId>,
    pub account: Option<AccountId>,
    pub trandate: Option<NaiveDate>,
    pub lines: Vec<InventoryAdjustmentLine>,
}

impl PreparedAdjustment {
    pub fn into_saved(self, id: AdjustmentId, created_at: DateTime<Utc>) -> InventoryAdjustment {
        InventoryAdjustment {
            id,
            subsidiary: self.subsidiary,
            reason_code: self.reason_code,
            account: self.account,
            trandate: self.trandate,
            lines: self.lines,
            created_at,
        }
    }
}

/// A saved inventory adjustment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    pub id: AdjustmentId,
    pub subsidiary: Option<SubsidiaryId>,
    pub reason_code: Option<ReasonCodeId>,
    pub account: Option<AccountId>,
    pub trandate: Option<NaiveDate>,
    pub lines: Vec<InventoryAdjustmentLine>,
    pub created_at: DateTime<Utc>,
}
