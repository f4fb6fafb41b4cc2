use rust_decimal::Decimal;

use invadj_adjustments::{InventoryAdjustment, InventoryAdjustmentLine};

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn adjustment_to_json(adj: InventoryAdjustment) -> serde_json::Value {
    serde_json::json!({
        "id": adj.id.get(),
        "subsidiary": adj.subsidiary.map(|v| v.get()),
        "reasonCode": adj.reason_code.map(|v| v.get()),
        "account": adj.account.map(|v| v.get()),
        "trandate": adj.trandate.map(|d| d.format("%Y-%m-%d").to_string()),
        "createdAt": adj.created_at.to_rfc3339(),
        "lines": adj.lines.iter().map(line_to_json).collect::<Vec<_>>(),
    })
}

fn line_to_json(line: &InventoryAdjustmentLine) -> serde_json::Value {
    serde_json::json!({
        "item": line.item.get(),
        "location": line.location.get(),
        "department": line.department.map(|v| v.get()),
        "adjustQtyBy": quantity_to_json(line.adjust_qty_by),
        "description": line.description,
    })
}

/// Quantities go out as JSON numbers; a value `serde_json` cannot hold as a
/// number falls back to its decimal string.
fn quantity_to_json(qty: Decimal) -> serde_json::Value {
    let text = qty.normalize().to_string();
    match text.parse::<serde_json::Number>() {
        Ok(n) => serde_json::Value::Number(n),
        Err(_) => serde_json::Value::String(text),
    }
}
