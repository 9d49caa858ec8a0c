use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::approval::RequestStatus;
use crate::models::role::Role;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub groups: Vec<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Provisioning form: Manager submits for approval, Admin creates directly.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRequestResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: RequestStatus,
    pub requested_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub password1: String,
    pub password2: String,
}

/// Nav-shell data: visibility flags plus pending queue counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SidebarResponse {
    pub show_approval_queue: bool,
    pub show_user_approval: bool,
    pub show_user_management: bool,
    pub approval_count: u64,
    pub user_requests_count: u64,
}
