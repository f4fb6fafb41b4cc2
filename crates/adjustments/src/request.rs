//! Inbound adjustment request and its validation.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use invadj_core::{DomainError, DomainResult};

/// One inventory adjustment, described by record names rather than ids.
///
/// Field names follow the wire format (`reasonCode`, `adjustQtyBy`, ...).
/// Missing string fields deserialize as empty and are rejected by
/// [`AdjustmentRequest::validate`] so the caller gets a field-level message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    #[serde(default)]
    pub reason_code: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub subsidiary: String,
    #[serde(default)]
    pub trandate: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub adjust_qty_by: Option<QuantityDelta>,
}

/// Signed on-hand quantity change for a single line.
///
/// Accepts a JSON integer, a JSON float (`2.5`) or a numeric string
/// (`"-0.25"`), since plain-text clients tend to quote numbers. The value is
/// carried as sent, fractional and zero quantities included.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity", into = "Decimal")]
pub struct QuantityDelta(Decimal);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
}

impl QuantityDelta {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn get(&self) -> Decimal {
        self.0
    }
}

impl From<i64> for QuantityDelta {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<QuantityDelta> for Decimal {
    fn from(value: QuantityDelta) -> Self {
        value.0
    }
}

impl TryFrom<RawQuantity> for QuantityDelta {
    type Error = String;

    fn try_from(raw: RawQuantity) -> Result<Self, Self::Error> {
        match raw {
            RawQuantity::Int(v) => Ok(Self::from(v)),
            RawQuantity::Float(v) => Decimal::from_f64(v)
                .map(Self)
                .ok_or_else(|| format!("adjustQtyBy is out of range: {v}")),
            RawQuantity::Text(s) => {
                let s = s.trim();
                s.parse::<Decimal>()
                    .or_else(|_| Decimal::from_scientific(s))
                    .map(Self)
                    .map_err(|_| format!("adjustQtyBy is not a number: {s:?}"))
            }
        }
    }
}

/// A request whose shape has been checked; names are still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub reason_code: &'a str,
    pub department: &'a str,
    pub subsidiary: &'a str,
    pub location: &'a str,
    pub item: &'a str,
    pub trandate: NaiveDate,
    pub adjust_qty_by: Decimal,
}

impl AdjustmentRequest {
    /// Check required fields, parse the date and quantity.
    ///
    /// Names are passed through untouched: lookups match them exactly.
    pub fn validate(&self) -> DomainResult<ValidatedRequest<'_>> {
        let reason_code = required("reasonCode", &self.reason_code)?;
        let department = required("department", &self.department)?;
        let subsidiary = required("subsidiary", &self.subsidiary)?;
        let location = required("location", &self.location)?;
        let item = required("item", &self.item)?;
        let trandate = parse_trandate(required("trandate", &self.trandate)?)?;

        let adjust_qty_by = self
            .adjust_qty_by
            .ok_or_else(|| DomainError::validation("adjustQtyBy is required"))?
            .get();

        Ok(ValidatedRequest {
            reason_code,
            department,
            subsidiary,
            location,
            item,
            trandate,
            adjust_qty_by,
        })
    }
}

fn required<'a>(field: &str, value: &'a str) -> DomainResult<&'a str> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Parse a transaction date.
///
/// Accepted forms: `2024-01-15`, RFC 3339 (`2024-01-15T08:30:00Z`, the date in
/// the given offset is kept) and US-style `1/15/2024`.
pub fn parse_trandate(raw: &str) -> DomainResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Ok(d);
    }
    Err(DomainError::validation(format!(
        "trandate is not a recognized date: {raw:?}"
    )))
}
