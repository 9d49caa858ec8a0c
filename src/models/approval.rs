use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::journal::LineInput;

pub use crate::entities::approval_requests::{ApprovalAction, RequestStatus};

/// Proposed new state of an entry, carried by a pending update request
/// and replayed verbatim on approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProposedEntryState {
    pub date: NaiveDate,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
    pub lines: Vec<LineInput>,
}

/// Snapshot stored with a pending delete request, for display in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteSnapshot {
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApprovalDecision {
    pub action: DecisionAction,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalRequestResponse {
    pub id: i64,
    pub entry_id: i64,
    pub action: ApprovalAction,
    pub requested_by: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// What an edit/delete attempt resulted in: applied directly, or parked
/// behind the 12-hour approval gate.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum MutationOutcome {
    Applied { entry_id: i64 },
    PendingApproval { request_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_proposed_state_survives_json_storage() {
        // the payload column is JSON; the typed state must come back intact
        let state = ProposedEntryState {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            reference: "INV-001".to_string(),
            description: "Corrected amounts".to_string(),
            lines: vec![
                LineInput {
                    account: "Cash".to_string(),
                    debit: dec!(150.00),
                    credit: dec!(0),
                    memo: String::new(),
                },
                LineInput {
                    account: "Revenue".to_string(),
                    debit: dec!(0),
                    credit: dec!(150.00),
                    memo: "adjusted".to_string(),
                },
            ],
        };
        let json = serde_json::to_value(&state).unwrap();
        let back: ProposedEntryState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_payload_defaults_for_missing_fields() {
        // older rows may be missing reference/description
        let json = serde_json::json!({
            "date": "2026-01-15",
            "lines": []
        });
        let state: ProposedEntryState = serde_json::from_value(json).unwrap();
        assert_eq!(state.reference, "");
        assert_eq!(state.description, "");
        assert!(state.lines.is_empty());
    }
}
