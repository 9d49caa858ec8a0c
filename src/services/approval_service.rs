use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{approval_request_entity as approvals, journal_entry_entity as entries};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalAction, ApprovalRequestResponse, AuditAction, AuditTarget, DecisionAction,
    ProposedEntryState, RequestStatus, validate_lines,
};
use crate::models::role::AuthUser;
use crate::services::audit::{log_activity, usernames_by_id};
use crate::services::entry_service::replace_lines;

#[derive(Clone)]
pub struct ApprovalService {
    pool: DatabaseConnection,
}

impl ApprovalService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn pending_requests(&self) -> AppResult<Vec<ApprovalRequestResponse>> {
        let rows = approvals::Entity::find()
            .filter(approvals::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(approvals::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let requester_ids: Vec<i64> = rows.iter().map(|r| r.requested_by).collect();
        let usernames = usernames_by_id(&self.pool, &requester_ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| ApprovalRequestResponse {
                id: r.id,
                entry_id: r.entry_id,
                action: r.action,
                requested_by: usernames.get(&r.requested_by).cloned(),
                status: r.status,
                created_at: r.created_at,
                payload: r.payload,
            })
            .collect())
    }

    pub async fn pending_count(&self) -> AppResult<u64> {
        let count = approvals::Entity::find()
            .filter(approvals::Column::Status.eq(RequestStatus::Pending))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// Approve or reject a pending request. The row is claimed with a
    /// conditional update, so of two concurrent resolvers exactly one
    /// wins; the other sees `AlreadyResolved` and nothing is applied twice.
    pub async fn resolve(
        &self,
        actor: &AuthUser,
        request_id: i64,
        decision: DecisionAction,
    ) -> AppResult<RequestStatus> {
        let txn = self.pool.begin().await?;

        let request = approvals::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Approval request not found".to_string()))?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::AlreadyResolved);
        }

        let new_status = match decision {
            DecisionAction::Approve => RequestStatus::Approved,
            DecisionAction::Reject => RequestStatus::Rejected,
        };

        let claimed = approvals::Entity::update_many()
            .set(approvals::ActiveModel {
                status: Set(new_status),
                approved_by: Set(Some(actor.id)),
                approved_at: Set(Some(Utc::now())),
                ..Default::default()
            })
            .filter(approvals::Column::Id.eq(request_id))
            .filter(approvals::Column::Status.eq(RequestStatus::Pending))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::AlreadyResolved);
        }

        if decision == DecisionAction::Approve {
            self.apply(&txn, actor, &request).await?;
        }

        txn.commit().await?;
        Ok(new_status)
    }

    /// Replay the stored mutation onto the live entry.
    async fn apply<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        actor: &AuthUser,
        request: &approvals::Model,
    ) -> AppResult<()> {
        let entry = entries::Entity::find_by_id(request.entry_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

        match request.action {
            ApprovalAction::Delete => {
                let mut model = entry.into_active_model();
                model.deleted_at = Set(Some(Utc::now()));
                model.updated_at = Set(Utc::now());
                model.updated_by = Set(Some(actor.id));
                model.update(conn).await?;

                log_activity(
                    conn,
                    actor.id,
                    AuditAction::Deleted,
                    AuditTarget::JournalEntry(request.entry_id),
                    Some(serde_json::json!({ "approved": true })),
                )
                .await?;
            }
            ApprovalAction::Update => {
                let payload = request.payload.clone().ok_or_else(|| {
                    AppError::InternalError("Approval request has no payload".to_string())
                })?;
                let proposed: ProposedEntryState = serde_json::from_value(payload)?;
                // balance may have been broken by whatever happened since
                // the request was filed; re-check before touching the entry
                validate_lines(&proposed.lines)?;

                let entry_id = entry.id;
                let mut model = entry.into_active_model();
                model.date = Set(proposed.date);
                model.reference = Set(proposed.reference.clone());
                model.description = Set(proposed.description.clone());
                model.updated_at = Set(Utc::now());
                model.updated_by = Set(Some(actor.id));
                model.update(conn).await?;

                replace_lines(conn, entry_id, &proposed.lines).await?;

                log_activity(
                    conn,
                    actor.id,
                    AuditAction::Updated,
                    AuditTarget::JournalEntry(entry_id),
                    Some(serde_json::json!({ "approved": true })),
                )
                .await?;
            }
        }
        Ok(())
    }
}
