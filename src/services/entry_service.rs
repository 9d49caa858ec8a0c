use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};

use crate::entities::{
    approval_request_entity as approvals, journal_entry_entity as entries,
    journal_entry_line_entity as lines,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalAction, AuditAction, AuditTarget, CreateEntryRequest, DeleteSnapshot,
    EntryDetailResponse, EntryFilter, EntryLineResponse, EntryResponse, EntryType, ExpenseRequest,
    LineInput, MutationOutcome, PaginatedResponse, PaginationParams, ProposedEntryState,
    RequestStatus, SaleRequest, UpdateEntryRequest, validate_lines,
};
use crate::models::role::AuthUser;
use crate::services::audit::{entry_activity, log_activity, usernames_by_id};

/// Window after creation within which Staff may still mutate directly.
pub const APPROVAL_CUTOFF_HOURS: i64 = 12;

/// Whether an edit/delete of an entry created at `created_at` must go
/// through the approval queue. Admin/Manager bypass the timer entirely;
/// Staff get a direct pass while the entry is not strictly older than
/// the cutoff (the boundary itself is inclusive).
pub fn requires_approval(actor: &AuthUser, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if actor.can_bypass_approval() {
        return false;
    }
    created_at < now - Duration::hours(APPROVAL_CUTOFF_HOURS)
}

/// One row of the records export sheet.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub reference: String,
    pub entry_type: EntryType,
    pub description: String,
    pub total: Decimal,
    pub created_by: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    entry_id: i64,
    total_debit: Decimal,
    total_credit: Decimal,
}

#[derive(Clone)]
pub struct EntryService {
    pool: DatabaseConnection,
}

impl EntryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active entries, newest first, with the period/range filters applied.
    fn filtered_query(filter: &EntryFilter) -> Select<entries::Entity> {
        let mut query = entries::Entity::find()
            .filter(entries::Column::DeletedAt.is_null())
            .order_by_desc(entries::Column::Date)
            .order_by_desc(entries::Column::CreatedAt);

        let today = Utc::now().date_naive();
        match filter.period.as_deref() {
            Some("day") => {
                if let Some(date) = filter.date {
                    query = query.filter(entries::Column::Date.eq(date));
                }
            }
            Some("week") => {
                let start = today - Duration::days(6);
                query = query
                    .filter(entries::Column::Date.gte(start))
                    .filter(entries::Column::Date.lte(today));
            }
            Some("month") => {
                if let Some(start) = NaiveDate::from_ymd_opt(today.year(), today.month(), 1) {
                    let next = if today.month() == 12 {
                        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                    } else {
                        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                    };
                    query = query.filter(entries::Column::Date.gte(start));
                    if let Some(next) = next {
                        query = query.filter(entries::Column::Date.lt(next));
                    }
                }
            }
            Some("year") => {
                if let (Some(start), Some(next)) = (
                    NaiveDate::from_ymd_opt(today.year(), 1, 1),
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1),
                ) {
                    query = query
                        .filter(entries::Column::Date.gte(start))
                        .filter(entries::Column::Date.lt(next));
                }
            }
            _ => {}
        }

        if let Some(from) = filter.date_from {
            query = query.filter(entries::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(entries::Column::Date.lte(to));
        }
        query
    }

    async fn totals_for(&self, entry_ids: &[i64]) -> AppResult<HashMap<i64, (Decimal, Decimal)>> {
        if entry_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = lines::Entity::find()
            .select_only()
            .column(lines::Column::EntryId)
            .column_as(lines::Column::Debit.sum(), "total_debit")
            .column_as(lines::Column::Credit.sum(), "total_credit")
            .filter(lines::Column::EntryId.is_in(entry_ids.to_vec()))
            .group_by(lines::Column::EntryId)
            .into_model::<TotalsRow>()
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.entry_id, (r.total_debit, r.total_credit)))
            .collect())
    }

    async fn to_responses(&self, models: Vec<entries::Model>) -> AppResult<Vec<EntryResponse>> {
        let ids: Vec<i64> = models.iter().map(|e| e.id).collect();
        let totals = self.totals_for(&ids).await?;
        let creator_ids: Vec<i64> = models.iter().filter_map(|e| e.created_by).collect();
        let usernames = usernames_by_id(&self.pool, &creator_ids).await?;

        Ok(models
            .into_iter()
            .map(|e| {
                let (debit, credit) = totals.get(&e.id).copied().unwrap_or_default();
                let created_by = e.created_by.and_then(|id| usernames.get(&id).cloned());
                EntryResponse {
                    id: e.id,
                    date: e.date,
                    reference: e.reference,
                    description: e.description,
                    entry_type: e.entry_type,
                    total_debit: debit,
                    total_credit: credit,
                    created_at: e.created_at,
                    updated_at: e.updated_at,
                    created_by,
                }
            })
            .collect())
    }

    pub async fn list_entries(
        &self,
        filter: &EntryFilter,
    ) -> AppResult<PaginatedResponse<EntryResponse>> {
        let params = PaginationParams {
            page: filter.page,
            page_size: filter.page_size,
        };
        let query = Self::filtered_query(filter);
        let total = query.clone().count(&self.pool).await?;
        let models = query
            .offset(params.get_offset())
            .limit(params.get_page_size())
            .all(&self.pool)
            .await?;
        let items = self.to_responses(models).await?;
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// Rows for the export sheet: same filters as the list, no pagination.
    pub async fn export_rows(&self, filter: &EntryFilter) -> AppResult<Vec<ExportRow>> {
        let models = Self::filtered_query(filter).all(&self.pool).await?;
        let responses = self.to_responses(models).await?;
        Ok(responses
            .into_iter()
            .map(|e| ExportRow {
                date: e.date,
                reference: e.reference,
                entry_type: e.entry_type,
                description: e.description,
                total: e.total_debit,
                created_by: e.created_by,
            })
            .collect())
    }

    async fn find_active(&self, entry_id: i64) -> AppResult<entries::Model> {
        entries::Entity::find_by_id(entry_id)
            .filter(entries::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))
    }

    pub async fn get_entry(&self, entry_id: i64) -> AppResult<EntryDetailResponse> {
        let model = self.find_active(entry_id).await?;
        let line_models = lines::Entity::find()
            .filter(lines::Column::EntryId.eq(entry_id))
            .order_by_asc(lines::Column::Id)
            .all(&self.pool)
            .await?;
        let activity = entry_activity(&self.pool, entry_id).await?;

        let mut responses = self.to_responses(vec![model]).await?;
        let entry = responses
            .pop()
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

        Ok(EntryDetailResponse {
            entry,
            lines: line_models
                .into_iter()
                .map(|l| EntryLineResponse {
                    id: l.id,
                    account: l.account,
                    debit: l.debit,
                    credit: l.credit,
                    memo: l.memo,
                })
                .collect(),
            activity,
        })
    }

    /// Persist a new entry with its lines in one transaction and log it.
    pub async fn create_entry(
        &self,
        actor: &AuthUser,
        request: CreateEntryRequest,
    ) -> AppResult<i64> {
        validate_lines(&request.lines)?;

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let entry = entries::ActiveModel {
            date: Set(request.date),
            reference: Set(request.reference),
            description: Set(request.description),
            entry_type: Set(request.entry_type),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            created_by: Set(Some(actor.id)),
            updated_by: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        insert_lines(&txn, entry.id, &request.lines).await?;
        log_activity(
            &txn,
            actor.id,
            AuditAction::Created,
            AuditTarget::JournalEntry(entry.id),
            None,
        )
        .await?;

        txn.commit().await?;
        Ok(entry.id)
    }

    /// Simplified sale: debit Cash/Card, credit Revenue.
    pub async fn record_sale(&self, actor: &AuthUser, request: SaleRequest) -> AppResult<i64> {
        if request.amount < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Amount must be non-negative".to_string(),
            ));
        }
        let lines = vec![
            LineInput {
                account: request.payment_method.account().to_string(),
                debit: request.amount,
                credit: Decimal::ZERO,
                memo: String::new(),
            },
            LineInput {
                account: "Revenue".to_string(),
                debit: Decimal::ZERO,
                credit: request.amount,
                memo: String::new(),
            },
        ];
        self.create_entry(
            actor,
            CreateEntryRequest {
                date: request.date,
                reference: request.reference,
                description: request.description,
                entry_type: EntryType::Sale,
                lines,
            },
        )
        .await
    }

    /// Simplified expense: debit the category account, credit Cash/Card.
    pub async fn record_expense(
        &self,
        actor: &AuthUser,
        request: ExpenseRequest,
    ) -> AppResult<i64> {
        if request.amount < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Amount must be non-negative".to_string(),
            ));
        }
        let lines = vec![
            LineInput {
                account: request.category,
                debit: request.amount,
                credit: Decimal::ZERO,
                memo: String::new(),
            },
            LineInput {
                account: request.payment_method.account().to_string(),
                debit: Decimal::ZERO,
                credit: request.amount,
                memo: String::new(),
            },
        ];
        self.create_entry(
            actor,
            CreateEntryRequest {
                date: request.date,
                reference: request.reference,
                description: request.description,
                entry_type: EntryType::Expense,
                lines,
            },
        )
        .await
    }

    /// Edit an entry. Applies directly inside the cutoff window (or for
    /// Admin/Manager); otherwise parks the proposed state in the queue.
    pub async fn update_entry(
        &self,
        actor: &AuthUser,
        entry_id: i64,
        request: UpdateEntryRequest,
    ) -> AppResult<MutationOutcome> {
        let entry = self.find_active(entry_id).await?;

        // reject bad line sets up front; a pending request is only created
        // for a proposal that would actually apply cleanly
        validate_lines(&request.lines)?;

        if requires_approval(actor, entry.created_at, Utc::now()) {
            let payload = ProposedEntryState {
                date: request.date,
                reference: request.reference,
                description: request.description,
                lines: request.lines,
            };
            let pending = approvals::ActiveModel {
                entry_id: Set(entry.id),
                action: Set(ApprovalAction::Update),
                requested_by: Set(actor.id),
                status: Set(RequestStatus::Pending),
                created_at: Set(Utc::now()),
                payload: Set(Some(serde_json::to_value(&payload)?)),
                ..Default::default()
            }
            .insert(&self.pool)
            .await?;
            return Ok(MutationOutcome::PendingApproval {
                request_id: pending.id,
            });
        }

        let txn = self.pool.begin().await?;

        let mut model = entry.clone().into_active_model();
        model.date = Set(request.date);
        model.reference = Set(request.reference);
        model.description = Set(request.description);
        if let Some(entry_type) = request.entry_type {
            model.entry_type = Set(entry_type);
        }
        model.updated_at = Set(Utc::now());
        model.updated_by = Set(Some(actor.id));
        model.update(&txn).await?;

        replace_lines(&txn, entry.id, &request.lines).await?;
        log_activity(
            &txn,
            actor.id,
            AuditAction::Updated,
            AuditTarget::JournalEntry(entry.id),
            None,
        )
        .await?;

        txn.commit().await?;
        Ok(MutationOutcome::Applied { entry_id: entry.id })
    }

    /// Soft-delete an entry, or queue a delete request past the cutoff.
    pub async fn delete_entry(
        &self,
        actor: &AuthUser,
        entry_id: i64,
    ) -> AppResult<MutationOutcome> {
        let entry = self.find_active(entry_id).await?;

        if requires_approval(actor, entry.created_at, Utc::now()) {
            let snapshot = DeleteSnapshot {
                date: entry.date,
                description: entry.description.clone(),
            };
            let pending = approvals::ActiveModel {
                entry_id: Set(entry.id),
                action: Set(ApprovalAction::Delete),
                requested_by: Set(actor.id),
                status: Set(RequestStatus::Pending),
                created_at: Set(Utc::now()),
                payload: Set(Some(serde_json::to_value(&snapshot)?)),
                ..Default::default()
            }
            .insert(&self.pool)
            .await?;
            return Ok(MutationOutcome::PendingApproval {
                request_id: pending.id,
            });
        }

        let txn = self.pool.begin().await?;

        let description = entry.description.clone();
        let mut model = entry.clone().into_active_model();
        model.deleted_at = Set(Some(Utc::now()));
        model.updated_at = Set(Utc::now());
        model.updated_by = Set(Some(actor.id));
        model.update(&txn).await?;

        log_activity(
            &txn,
            actor.id,
            AuditAction::Deleted,
            AuditTarget::JournalEntry(entry.id),
            Some(serde_json::json!({ "description": description })),
        )
        .await?;

        txn.commit().await?;
        Ok(MutationOutcome::Applied { entry_id: entry.id })
    }
}

pub(crate) async fn insert_lines<C: sea_orm::ConnectionTrait>(
    conn: &C,
    entry_id: i64,
    line_inputs: &[LineInput],
) -> AppResult<()> {
    if line_inputs.is_empty() {
        return Ok(());
    }
    let models: Vec<lines::ActiveModel> = line_inputs
        .iter()
        .map(|l| lines::ActiveModel {
            entry_id: Set(entry_id),
            account: Set(l.account.clone()),
            debit: Set(l.debit),
            credit: Set(l.credit),
            memo: Set(l.memo.clone()),
            ..Default::default()
        })
        .collect();
    lines::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

pub(crate) async fn replace_lines<C: sea_orm::ConnectionTrait>(
    conn: &C,
    entry_id: i64,
    line_inputs: &[LineInput],
) -> AppResult<()> {
    lines::Entity::delete_many()
        .filter(lines::Column::EntryId.eq(entry_id))
        .exec(conn)
        .await?;
    insert_lines(conn, entry_id, line_inputs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn actor(groups: &[&str]) -> AuthUser {
        AuthUser {
            id: 7,
            username: "actor".to_string(),
            is_superuser: false,
            groups: groups.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_admin_and_manager_bypass_cutoff() {
        let now = Utc::now();
        let ancient = now - Duration::days(400);
        assert!(!requires_approval(&actor(&["Admin"]), ancient, now));
        assert!(!requires_approval(&actor(&["Manager"]), ancient, now));
        assert!(actor(&["Admin"]).has_role(Role::Manager));
    }

    #[test]
    fn test_staff_direct_within_window() {
        let now = Utc::now();
        let recent = now - Duration::hours(1);
        assert!(!requires_approval(&actor(&["Staff"]), recent, now));
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let now = Utc::now();
        let exactly = now - Duration::hours(APPROVAL_CUTOFF_HOURS);
        // exactly 12h old: not older than the cutoff, still a direct apply
        assert!(!requires_approval(&actor(&["Staff"]), exactly, now));
        // one tick past: approval required
        let one_past = exactly - Duration::seconds(1);
        assert!(requires_approval(&actor(&["Staff"]), one_past, now));
    }

    #[test]
    fn test_staff_deferred_past_window() {
        let now = Utc::now();
        let old = now - Duration::hours(13);
        assert!(requires_approval(&actor(&["Staff"]), old, now));
        assert!(requires_approval(&actor(&["Viewer"]), old, now));
    }
}
