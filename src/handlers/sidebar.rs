use actix_web::{HttpRequest, HttpResponse, Result, web};

use crate::handlers::auth_user;
use crate::models::{ApiResponse, Role, SidebarResponse};
use crate::services::{ApprovalService, UserRequestService};

/// Navigation flags and badge counts for the signed-in user. Counts are
/// only computed for roles that can see the corresponding queue.
#[utoipa::path(
    get,
    path = "/sidebar",
    tag = "sidebar",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visibility flags and pending counts"))
)]
pub async fn sidebar(
    approval_service: web::Data<ApprovalService>,
    user_request_service: web::Data<UserRequestService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = auth_user(&req)?;
    let is_manager = actor.has_role(Role::Manager);
    let is_admin = actor.has_role(Role::Admin);

    let approval_count = if is_manager {
        approval_service.pending_count().await?
    } else {
        0
    };
    let user_requests_count = if is_admin {
        user_request_service.pending_count().await?
    } else {
        0
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(SidebarResponse {
        show_approval_queue: is_manager,
        show_user_approval: is_admin,
        show_user_management: is_admin,
        approval_count,
        user_requests_count,
    })))
}

pub fn sidebar_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/sidebar", web::get().to(sidebar));
}
