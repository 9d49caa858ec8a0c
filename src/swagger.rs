use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::entries::list_entries,
        handlers::entries::export_records,
        handlers::entries::get_entry,
        handlers::entries::create_entry,
        handlers::entries::record_sale,
        handlers::entries::record_expense,
        handlers::entries::update_entry,
        handlers::entries::delete_entry,
        handlers::approvals::list_approvals,
        handlers::approvals::resolve_approval,
        handlers::user_requests::submit_user_request,
        handlers::user_requests::list_user_requests,
        handlers::user_requests::resolve_user_request,
        handlers::users::list_users,
        handlers::users::reset_password,
        handlers::users::toggle_lock,
        handlers::sidebar::sidebar,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            Role,
            EntryType,
            PaymentMethod,
            LineInput,
            CreateEntryRequest,
            UpdateEntryRequest,
            SaleRequest,
            ExpenseRequest,
            EntryFilter,
            EntryLineResponse,
            EntryResponse,
            EntryDetailResponse,
            ActivityLogResponse,
            AuditAction,
            ApprovalAction,
            RequestStatus,
            ApprovalDecision,
            DecisionAction,
            ApprovalRequestResponse,
            ProposedEntryState,
            DeleteSnapshot,
            MutationOutcome,
            SubmitUserRequest,
            UserRequestResponse,
            UserResponse,
            ResetPasswordRequest,
            SidebarResponse,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "records", description = "Journal entries and exports"),
        (name = "approvals", description = "Deferred edit/delete review queue"),
        (name = "user-requests", description = "Account provisioning queue"),
        (name = "users", description = "Account administration"),
        (name = "sidebar", description = "Navigation flags and badge counts"),
    ),
    info(
        title = "Pure Herb Backend API",
        version = "1.0.0",
        description = "Double-entry bookkeeping REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
