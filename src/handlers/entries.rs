use actix_web::{HttpRequest, HttpResponse, Result, web};
use chrono::Utc;

use crate::handlers::require_role;
use crate::models::{
    ApiResponse, CreateEntryRequest, EntryDetailResponse, EntryFilter, ExpenseRequest,
    MutationOutcome, Role, SaleRequest, UpdateEntryRequest,
};
use crate::services::export_service::{EXPORT_CONTENT_TYPE, build_records_workbook, export_filename};
use crate::services::EntryService;

#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    params(
        ("period" = Option<String>, Query, description = "day / week / month / year"),
        ("date" = Option<String>, Query, description = "Day to show when period=day (ISO date)"),
        ("date_from" = Option<String>, Query, description = "Range start (ISO date)"),
        ("date_to" = Option<String>, Query, description = "Range end (ISO date)"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active entries with totals"),
        (status = 403, description = "No role")
    )
)]
pub async fn list_entries(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    query: web::Query<EntryFilter>,
) -> Result<HttpResponse> {
    require_role(&req, Role::Viewer)?;
    let page = entry_service.list_entries(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/records/export",
    tag = "records",
    params(
        ("date_from" = Option<String>, Query, description = "Range start (ISO date)"),
        ("date_to" = Option<String>, Query, description = "Range end (ISO date)")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Branded xlsx workbook of the filtered records"),
        (status = 501, description = "Export feature not built in")
    )
)]
pub async fn export_records(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    query: web::Query<EntryFilter>,
) -> Result<HttpResponse> {
    require_role(&req, Role::Viewer)?;
    let rows = entry_service.export_rows(&query).await?;
    let bytes = build_records_workbook(&rows)?;
    let filename = export_filename(Utc::now().date_naive());
    Ok(HttpResponse::Ok()
        .content_type(EXPORT_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes))
}

#[utoipa::path(
    get,
    path = "/entries/{id}",
    tag = "records",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Entry with lines and activity trail", body = EntryDetailResponse),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_entry(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_role(&req, Role::Viewer)?;
    let detail = entry_service.get_entry(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(detail)))
}

#[utoipa::path(
    post,
    path = "/entries",
    tag = "records",
    request_body = CreateEntryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Entry created"),
        (status = 400, description = "Imbalanced or invalid lines")
    )
)]
pub async fn create_entry(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    request: web::Json<CreateEntryRequest>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Staff)?;
    let entry_id = entry_service.create_entry(&actor, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        serde_json::json!({ "entry_id": entry_id }),
        "Record created successfully".to_string(),
    )))
}

#[utoipa::path(
    post,
    path = "/entries/sales",
    tag = "records",
    request_body = SaleRequest,
    security(("bearer_auth" = [])),
    responses((status = 201, description = "Sale recorded"))
)]
pub async fn record_sale(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    request: web::Json<SaleRequest>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Staff)?;
    let entry_id = entry_service.record_sale(&actor, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        serde_json::json!({ "entry_id": entry_id }),
        "Sale recorded successfully".to_string(),
    )))
}

#[utoipa::path(
    post,
    path = "/entries/expenses",
    tag = "records",
    request_body = ExpenseRequest,
    security(("bearer_auth" = [])),
    responses((status = 201, description = "Expense recorded"))
)]
pub async fn record_expense(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    request: web::Json<ExpenseRequest>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Staff)?;
    let entry_id = entry_service
        .record_expense(&actor, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        serde_json::json!({ "entry_id": entry_id }),
        "Expense recorded successfully".to_string(),
    )))
}

#[utoipa::path(
    put,
    path = "/entries/{id}",
    tag = "records",
    request_body = UpdateEntryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Applied directly or queued for approval", body = MutationOutcome),
        (status = 400, description = "Imbalanced or invalid lines")
    )
)]
pub async fn update_entry(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateEntryRequest>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Staff)?;
    let outcome = entry_service
        .update_entry(&actor, path.into_inner(), request.into_inner())
        .await?;
    let message = match &outcome {
        MutationOutcome::Applied { .. } => "Record updated successfully",
        MutationOutcome::PendingApproval { .. } => {
            "Your update request has been submitted for approval"
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        outcome,
        message.to_string(),
    )))
}

#[utoipa::path(
    delete,
    path = "/entries/{id}",
    tag = "records",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Soft-deleted or queued for approval", body = MutationOutcome)
    )
)]
pub async fn delete_entry(
    entry_service: web::Data<EntryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = require_role(&req, Role::Staff)?;
    let outcome = entry_service
        .delete_entry(&actor, path.into_inner())
        .await?;
    let message = match &outcome {
        MutationOutcome::Applied { .. } => "Record deleted",
        MutationOutcome::PendingApproval { .. } => {
            "Your delete request has been submitted for approval"
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        outcome,
        message.to_string(),
    )))
}

pub fn entry_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/records", web::get().to(list_entries))
        .route("/records/export", web::get().to(export_records))
        .service(
            web::scope("/entries")
                .route("", web::post().to(create_entry))
                .route("/sales", web::post().to(record_sale))
                .route("/expenses", web::post().to(record_expense))
                .route("/{id}", web::get().to(get_entry))
                .route("/{id}", web::put().to(update_entry))
                .route("/{id}", web::delete().to(delete_entry)),
        );
}
