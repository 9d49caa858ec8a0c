use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::require_role;
use crate::models::{ApiResponse, PaginationParams, ResetPasswordRequest, Role};
use crate::services::AccountService;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts with their groups"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    require_role(&req, Role::Admin)?;
    let page = account_service.list_users(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

#[utoipa::path(
    post,
    path = "/users/{id}/reset-password",
    tag = "users",
    request_body = ResetPasswordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Password replaced"),
        (status = 403, description = "Protected account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn reset_password(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    require_role(&req, Role::Admin)?;
    let username = account_service
        .reset_password(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "username": username }),
        format!("Password for {username} has been reset"),
    )))
}

#[utoipa::path(
    post,
    path = "/users/{id}/lock",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active flag toggled"),
        (status = 403, description = "Protected account, self-lock, or last active admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_lock(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Admin)?;
    let user = account_service.toggle_lock(&actor, path.into_inner()).await?;
    let message = if user.is_active {
        format!("{} has been unlocked", user.username)
    } else {
        format!("{} has been locked", user.username)
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(user, message)))
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}/reset-password", web::post().to(reset_password))
            .route("/{id}/lock", web::post().to(toggle_lock)),
    );
}
