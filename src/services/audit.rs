use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{activity_log_entity as logs, user_entity as users};
use crate::error::AppResult;
use crate::models::{ActivityLogResponse, AuditAction, AuditTarget};

/// Append one activity record. Runs on the caller's connection so it
/// commits (or rolls back) together with the mutation it describes.
pub async fn log_activity<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    action: AuditAction,
    target: AuditTarget,
    extra: Option<serde_json::Value>,
) -> AppResult<()> {
    logs::ActiveModel {
        user_id: Set(user_id),
        action: Set(action),
        target_kind: Set(target.kind().to_string()),
        target_id: Set(target.id()),
        timestamp: Set(Utc::now()),
        extra: Set(extra),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Full trail for one journal entry, newest first, with actor usernames.
pub async fn entry_activity<C: ConnectionTrait>(
    conn: &C,
    entry_id: i64,
) -> AppResult<Vec<ActivityLogResponse>> {
    let target = AuditTarget::JournalEntry(entry_id);
    let rows = logs::Entity::find()
        .filter(logs::Column::TargetKind.eq(target.kind()))
        .filter(logs::Column::TargetId.eq(target.id()))
        .order_by_desc(logs::Column::Timestamp)
        .all(conn)
        .await?;

    let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
    let usernames = usernames_by_id(conn, &user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|r| ActivityLogResponse {
            id: r.id,
            user: usernames.get(&r.user_id).cloned(),
            action: r.action,
            timestamp: r.timestamp,
            extra: r.extra,
        })
        .collect())
}

pub async fn usernames_by_id<C: ConnectionTrait>(
    conn: &C,
    user_ids: &[i64],
) -> AppResult<HashMap<i64, String>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids.to_vec()))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|u| (u.id, u.username)).collect())
}
