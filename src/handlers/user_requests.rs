use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::require_role;
use crate::models::{ApiResponse, ApprovalDecision, DecisionAction, Role, SubmitUserRequest};
use crate::services::UserRequestService;

#[utoipa::path(
    post,
    path = "/user-requests",
    tag = "user-requests",
    request_body = SubmitUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Account created directly (admin) or queued for review"),
        (status = 400, description = "Role not grantable or username taken"),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn submit_user_request(
    user_request_service: web::Data<UserRequestService>,
    req: HttpRequest,
    request: web::Json<SubmitUserRequest>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Manager)?;
    let outcome = user_request_service
        .submit(&actor, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(outcome)))
}

#[utoipa::path(
    get,
    path = "/user-requests",
    tag = "user-requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending account requests"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_user_requests(
    user_request_service: web::Data<UserRequestService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_role(&req, Role::Admin)?;
    let pending = user_request_service.pending_requests().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(pending)))
}

#[utoipa::path(
    post,
    path = "/user-requests/{id}/action",
    tag = "user-requests",
    request_body = ApprovalDecision,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request resolved"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already resolved by another reviewer")
    )
)]
pub async fn resolve_user_request(
    user_request_service: web::Data<UserRequestService>,
    req: HttpRequest,
    path: web::Path<i64>,
    decision: web::Json<ApprovalDecision>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Admin)?;
    let decision = decision.into_inner();
    let message = match decision.action {
        DecisionAction::Approve => "Account request approved",
        DecisionAction::Reject => "Account request rejected",
    };
    let status = user_request_service
        .resolve(&actor, path.into_inner(), decision.action)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "status": status }),
        message.to_string(),
    )))
}

pub fn user_request_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user-requests")
            .route("", web::post().to(submit_user_request))
            .route("", web::get().to(list_user_requests))
            .route("/{id}/action", web::post().to(resolve_user_request)),
    );
}
