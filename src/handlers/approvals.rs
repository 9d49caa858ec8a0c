use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::require_role;
use crate::models::{ApiResponse, ApprovalDecision, DecisionAction, Role};
use crate::services::ApprovalService;

#[utoipa::path(
    get,
    path = "/approvals",
    tag = "approvals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending edit/delete requests"),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn list_approvals(
    approval_service: web::Data<ApprovalService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_role(&req, Role::Manager)?;
    let pending = approval_service.pending_requests().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(pending)))
}

#[utoipa::path(
    post,
    path = "/approvals/{id}/action",
    tag = "approvals",
    request_body = ApprovalDecision,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request resolved"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already resolved by another reviewer")
    )
)]
pub async fn resolve_approval(
    approval_service: web::Data<ApprovalService>,
    req: HttpRequest,
    path: web::Path<i64>,
    decision: web::Json<ApprovalDecision>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Manager)?;
    let decision = decision.into_inner();
    let message = match decision.action {
        DecisionAction::Approve => "Request approved",
        DecisionAction::Reject => "Request rejected",
    };
    let status = approval_service
        .resolve(&actor, path.into_inner(), decision.action)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "status": status }),
        message.to_string(),
    )))
}

pub fn approval_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/approvals")
            .route("", web::get().to(list_approvals))
            .route("/{id}/action", web::post().to(resolve_approval)),
    );
}
