use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{
    user_entity as users, user_group_entity as user_groups, user_request_entity as user_requests,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DecisionAction, RequestStatus, Role, SubmitUserRequest, UserRequestResponse,
};
use crate::models::role::AuthUser;
use crate::services::audit::usernames_by_id;
use crate::utils::{generate_random_password, hash_password};

#[derive(Clone)]
pub struct UserRequestService {
    pool: DatabaseConnection,
}

impl UserRequestService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Manager files a provisioning request; Admin submissions skip the
    /// queue and create the account immediately, keeping an already-approved
    /// request row as the audit trail.
    pub async fn submit(
        &self,
        actor: &AuthUser,
        request: SubmitUserRequest,
    ) -> AppResult<UserRequestResponse> {
        if request.username.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        let is_admin = actor.has_role(Role::Admin);
        validate_requested_role(is_admin, request.role)?;

        if is_admin {
            let txn = self.pool.begin().await?;
            create_account(
                &txn,
                &request.username,
                &request.email,
                &request.password,
                request.role,
            )
            .await?;
            let row = user_requests::ActiveModel {
                requested_by: Set(actor.id),
                username: Set(request.username.clone()),
                email: Set(request.email.clone()),
                role: Set(request.role.as_str().to_string()),
                // account already exists; no reason to retain the password
                password: Set(String::new()),
                status: Set(RequestStatus::Approved),
                approved_by: Set(Some(actor.id)),
                approved_at: Set(Some(Utc::now())),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;
            log::info!("User {} created directly by admin {}", row.username, actor.username);
            return Ok(self.to_response(row).await);
        }

        // stored as-is until the admin resolves the request
        let row = user_requests::ActiveModel {
            requested_by: Set(actor.id),
            username: Set(request.username),
            email: Set(request.email),
            role: Set(request.role.as_str().to_string()),
            password: Set(request.password),
            status: Set(RequestStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(self.to_response(row).await)
    }

    async fn to_response(&self, row: user_requests::Model) -> UserRequestResponse {
        let requested_by = usernames_by_id(&self.pool, &[row.requested_by])
            .await
            .ok()
            .and_then(|m| m.get(&row.requested_by).cloned());
        UserRequestResponse {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            status: row.status,
            requested_by,
            created_at: row.created_at,
        }
    }

    pub async fn pending_requests(&self) -> AppResult<Vec<UserRequestResponse>> {
        let rows = user_requests::Entity::find()
            .filter(user_requests::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(user_requests::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let requester_ids: Vec<i64> = rows.iter().map(|r| r.requested_by).collect();
        let usernames = usernames_by_id(&self.pool, &requester_ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| UserRequestResponse {
                id: r.id,
                username: r.username,
                email: r.email,
                role: r.role,
                status: r.status,
                requested_by: usernames.get(&r.requested_by).cloned(),
                created_at: r.created_at,
            })
            .collect())
    }

    pub async fn pending_count(&self) -> AppResult<u64> {
        let count = user_requests::Entity::find()
            .filter(user_requests::Column::Status.eq(RequestStatus::Pending))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// Admin resolves a pending request. Approval creates the account with
    /// the retained password (or a random one when none was stored).
    pub async fn resolve(
        &self,
        actor: &AuthUser,
        request_id: i64,
        decision: DecisionAction,
    ) -> AppResult<RequestStatus> {
        let txn = self.pool.begin().await?;

        let request = user_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User request not found".to_string()))?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::AlreadyResolved);
        }

        let new_status = match decision {
            DecisionAction::Approve => RequestStatus::Approved,
            DecisionAction::Reject => RequestStatus::Rejected,
        };

        let claimed = user_requests::Entity::update_many()
            .set(user_requests::ActiveModel {
                status: Set(new_status),
                approved_by: Set(Some(actor.id)),
                approved_at: Set(Some(Utc::now())),
                // the plaintext password has served its purpose either way
                password: Set(String::new()),
                ..Default::default()
            })
            .filter(user_requests::Column::Id.eq(request_id))
            .filter(user_requests::Column::Status.eq(RequestStatus::Pending))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::AlreadyResolved);
        }

        if decision == DecisionAction::Approve {
            let role = Role::parse(&request.role).unwrap_or(Role::Viewer);
            create_account(&txn, &request.username, &request.email, &request.password, role)
                .await?;
            log::info!(
                "User {} created from request {} by {}",
                request.username,
                request.id,
                actor.username
            );
        }

        txn.commit().await?;
        Ok(new_status)
    }
}

/// Non-admins can only request Staff or Viewer accounts.
pub(crate) fn validate_requested_role(actor_is_admin: bool, role: Role) -> AppResult<()> {
    if !actor_is_admin && matches!(role, Role::Admin | Role::Manager) {
        return Err(AppError::ValidationError(
            "You cannot request Admin or Manager roles".to_string(),
        ));
    }
    Ok(())
}

/// Create the account plus its group membership row.
pub(crate) async fn create_account<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<users::Model> {
    let existing = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(AppError::ValidationError(format!(
            "Username {username} is already taken"
        )));
    }

    let effective = if password.is_empty() {
        generate_random_password()
    } else {
        password.to_string()
    };
    let now = Utc::now();
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(&effective)?),
        is_superuser: Set(false),
        is_active: Set(true),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    user_groups::ActiveModel {
        user_id: Set(user.id),
        group_name: Set(role.group_name().to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_limited_to_staff_and_viewer() {
        assert!(validate_requested_role(false, Role::Staff).is_ok());
        assert!(validate_requested_role(false, Role::Viewer).is_ok());
        assert!(matches!(
            validate_requested_role(false, Role::Manager),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            validate_requested_role(false, Role::Admin),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_admin_may_request_any_role() {
        assert!(validate_requested_role(true, Role::Admin).is_ok());
        assert!(validate_requested_role(true, Role::Manager).is_ok());
        assert!(validate_requested_role(true, Role::Staff).is_ok());
    }
}
