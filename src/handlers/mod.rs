pub mod approvals;
pub mod auth;
pub mod entries;
pub mod sidebar;
pub mod user_requests;
pub mod users;

pub use approvals::approval_config;
pub use auth::auth_config;
pub use entries::entry_config;
pub use sidebar::sidebar_config;
pub use user_requests::user_request_config;
pub use users::user_config;

use actix_web::{HttpMessage, HttpRequest};

use crate::error::AppError;
use crate::models::role::{AuthUser, Role};

/// Identity placed in request extensions by the auth middleware.
pub(crate) fn auth_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing authenticated user".to_string()))
}

pub(crate) fn require_role(req: &HttpRequest, role: Role) -> Result<AuthUser, AppError> {
    let user = auth_user(req)?;
    if !user.has_role(role) {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}
