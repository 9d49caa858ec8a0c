use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{user_entity as users, user_group_entity as user_groups};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest};
use crate::models::role::AuthUser;
use crate::utils::{JwtService, verify_password};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    async fn load_auth_user(&self, user: users::Model) -> AppResult<AuthUser> {
        let groups = user_groups::Entity::find()
            .filter(user_groups::Column::UserId.eq(user.id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|g| g.group_name)
            .collect();
        Ok(AuthUser {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            groups,
        })
    }

    fn issue_tokens(&self, user: &AuthUser) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.jwt_service.generate_access_token(user)?,
            refresh_token: self.jwt_service.generate_refresh_token(user)?,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }
        if !user.is_active {
            return Err(AppError::AuthError("Account is locked".to_string()));
        }

        let auth_user = self.load_auth_user(user).await?;
        log::info!("User {} logged in", auth_user.username);
        self.issue_tokens(&auth_user)
    }

    /// Tokens are re-issued from the database row, so a lock or group
    /// change applies on the next refresh at the latest.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if !user.is_active {
            return Err(AppError::AuthError("Account is locked".to_string()));
        }

        let auth_user = self.load_auth_user(user).await?;
        self.issue_tokens(&auth_user)
    }
}
