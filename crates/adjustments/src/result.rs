//! Response body of the adjustment endpoint.

use serde::{Deserialize, Serialize};

use invadj_core::AdjustmentId;

use crate::error::AdjustmentError;

/// Outcome of one request.
///
/// Serializes as `{"status": "successful", "message": <id>}` or
/// `{"status": "failed", "message": "<error text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum AdjustmentResult {
    Successful(AdjustmentId),
    Failed(String),
}

impl AdjustmentResult {
    pub fn is_successful(&self) -> bool {
        matches!(self, AdjustmentResult::Successful(_))
    }

    pub fn adjustment_id(&self) -> Option<AdjustmentId> {
        match self {
            AdjustmentResult::Successful(id) => Some(*id),
            AdjustmentResult::Failed(_) => None,
        }
    }
}

impl From<Result<AdjustmentId, AdjustmentError>> for AdjustmentResult {
    fn from(value: Result<AdjustmentId, AdjustmentError>) -> Self {
        match value {
            Ok(id) => AdjustmentResult::Successful(id),
            Err(e) => AdjustmentResult::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let ok = AdjustmentResult::Successful(AdjustmentId::new(501).unwrap());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "successful", "message": 501})
        );

        let failed = AdjustmentResult::Failed("item not found: SKU-9".to_string());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "failed", "message": "item not found: SKU-9"})
        );
    }

    #[test]
    fn errors_become_failed_with_their_message() {
        let err = AdjustmentError::reason_code_not_found("SHRINK");
        let result = AdjustmentResult::from(Err(err));
        assert_eq!(result, AdjustmentResult::Failed("reason code not found: SHRINK".to_string()));
        assert!(!result.is_successful());
        assert_eq!(result.adjustment_id(), None);
    }
}
