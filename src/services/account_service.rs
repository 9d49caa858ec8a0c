use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{user_entity as users, user_group_entity as user_groups};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, ResetPasswordRequest, Role, UserResponse};
use crate::models::role::AuthUser;
use crate::utils::hash_password;

#[derive(Clone)]
pub struct AccountService {
    pool: DatabaseConnection,
    /// Protected system account; exempt from lock/unlock and password reset.
    hardwired_username: Option<String>,
}

impl AccountService {
    pub fn new(pool: DatabaseConnection, hardwired_username: Option<String>) -> Self {
        Self {
            pool,
            hardwired_username,
        }
    }

    fn is_hardwired(&self, username: &str) -> bool {
        self.hardwired_username.as_deref() == Some(username)
    }

    async fn groups_for(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, Vec<String>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = user_groups::Entity::find()
            .filter(user_groups::Column::UserId.is_in(user_ids.to_vec()))
            .all(&self.pool)
            .await?;
        let mut map: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.user_id).or_default().push(row.group_name);
        }
        Ok(map)
    }

    fn to_response(user: users::Model, groups: Vec<String>) -> UserResponse {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            groups,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }

    pub async fn list_users(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let mut query = users::Entity::find().order_by_asc(users::Column::Username);
        if let Some(hardwired) = &self.hardwired_username {
            query = query.filter(users::Column::Username.ne(hardwired.as_str()));
        }
        let total = query.clone().count(&self.pool).await?;
        let models = query
            .offset(params.get_offset())
            .limit(params.get_page_size())
            .all(&self.pool)
            .await?;

        let ids: Vec<i64> = models.iter().map(|u| u.id).collect();
        let mut groups = self.groups_for(&ids).await?;
        let items = models
            .into_iter()
            .map(|u| {
                let g = groups.remove(&u.id).unwrap_or_default();
                Self::to_response(u, g)
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn reset_password(
        &self,
        target_id: i64,
        request: ResetPasswordRequest,
    ) -> AppResult<String> {
        let target = self.find_user(target_id).await?;
        if self.is_hardwired(&target.username) {
            return Err(AppError::ProtectedAccount);
        }
        if request.password1.is_empty() || request.password1 != request.password2 {
            return Err(AppError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }

        let username = target.username.clone();
        let mut model = target.into_active_model();
        model.password_hash = Set(hash_password(&request.password1)?);
        model.updated_at = Set(Some(Utc::now()));
        model.update(&self.pool).await?;

        log::info!("Password reset for user {username}");
        Ok(username)
    }

    /// Flip the active flag. Locking is refused for the hardwired account,
    /// for the actor's own account, and for the last active Admin.
    pub async fn toggle_lock(&self, actor: &AuthUser, target_id: i64) -> AppResult<UserResponse> {
        let target = self.find_user(target_id).await?;

        let target_is_admin = user_groups::Entity::find()
            .filter(user_groups::Column::UserId.eq(target.id))
            .filter(user_groups::Column::GroupName.eq(Role::Admin.group_name()))
            .one(&self.pool)
            .await?
            .is_some();
        let active_admins = self.active_admin_count().await?;

        let new_active = lock_guard(
            self.is_hardwired(&target.username),
            target.id == actor.id,
            target.is_active,
            target_is_admin,
            active_admins,
        )?;

        let id = target.id;
        let mut model = target.into_active_model();
        model.is_active = Set(new_active);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        log::info!(
            "User {} has been {}",
            updated.username,
            if new_active { "unlocked" } else { "locked" }
        );
        let groups = self
            .groups_for(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Self::to_response(updated, groups))
    }

    async fn active_admin_count(&self) -> AppResult<u64> {
        let count = users::Entity::find()
            .filter(users::Column::IsActive.eq(true))
            .join(JoinType::InnerJoin, users::Relation::UserGroups.def())
            .filter(user_groups::Column::GroupName.eq(Role::Admin.group_name()))
            .count(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Decide a lock toggle: returns the new active flag, or the guard error
/// refusing it. Unlocking always passes the admin-count check; locking an
/// Admin requires at least one other active Admin to remain.
pub(crate) fn lock_guard(
    is_hardwired: bool,
    is_self: bool,
    target_active: bool,
    target_is_admin: bool,
    active_admins: u64,
) -> AppResult<bool> {
    if is_hardwired {
        return Err(AppError::ProtectedAccount);
    }
    if is_self {
        return Err(AppError::SelfLockout);
    }
    if !target_active {
        return Ok(true);
    }
    if target_is_admin && active_admins <= 1 {
        return Err(AppError::LastAdminLockout);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locking_last_active_admin_refused() {
        assert!(matches!(
            lock_guard(false, false, true, true, 1),
            Err(AppError::LastAdminLockout)
        ));
        // no active admins at all would leave zero after the lock too
        assert!(matches!(
            lock_guard(false, false, true, true, 0),
            Err(AppError::LastAdminLockout)
        ));
    }

    #[test]
    fn test_locking_admin_with_another_active_succeeds() {
        assert!(!lock_guard(false, false, true, true, 2).unwrap());
    }

    #[test]
    fn test_locking_non_admin_ignores_admin_count() {
        assert!(!lock_guard(false, false, true, false, 1).unwrap());
    }

    #[test]
    fn test_self_lock_refused() {
        assert!(matches!(
            lock_guard(false, true, true, false, 5),
            Err(AppError::SelfLockout)
        ));
    }

    #[test]
    fn test_hardwired_account_refused_either_way() {
        assert!(matches!(
            lock_guard(true, false, true, false, 5),
            Err(AppError::ProtectedAccount)
        ));
        assert!(matches!(
            lock_guard(true, false, false, false, 5),
            Err(AppError::ProtectedAccount)
        ));
    }

    #[test]
    fn test_unlock_always_allowed() {
        // even when the target is an admin and no other admin is active
        assert!(lock_guard(false, false, false, true, 0).unwrap());
    }
}
