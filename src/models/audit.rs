use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

pub use crate::entities::activity_logs::AuditAction;

/// Closed set of audited entity kinds. Journal entries are the only
/// audited target today; extending the set means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTarget {
    JournalEntry(i64),
}

impl AuditTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditTarget::JournalEntry(_) => "journal_entry",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            AuditTarget::JournalEntry(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: i64,
    pub user: Option<String>,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}
