//! Compliance instance routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::routes::{client_ip, user_agent};
use domain::models::{ComplianceInstanceQuery, UpdateComplianceInstanceRequest};
use domain::services::{audit_helpers, record_snapshot};
use persistence::repositories::{
    AuditLogRepository, ComplianceInstanceRepository, ComplianceInstanceUpdate,
};
use shared::pagination::Paginated;

/// Create compliance instances router.
///
/// Routes:
/// - GET   /api/v1/organizations/:org_id/compliance-instances
/// - GET   /api/v1/organizations/:org_id/compliance-instances/:id
/// - PATCH /api/v1/organizations/:org_id/compliance-instances/:id
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_compliance_instances))
        .route(
            "/:id",
            get(get_compliance_instance).patch(update_compliance_instance),
        )
}

/// List compliance instances with filtering and pagination.
async fn list_compliance_instances(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    query: Result<Query<ComplianceInstanceQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let filters = query.filters()?;
    let page = state.page_request(query.page, query.per_page);

    let repo = ComplianceInstanceRepository::new(state.pool.clone());
    let (records, total) = repo.list(org_id, &filters, page).await?;

    info!(
        organization_id = %org_id,
        returned = records.len(),
        total = total,
        "Listed compliance instances"
    );

    Ok((StatusCode::OK, Json(Paginated::new(records, page, total))))
}

/// Get a single compliance instance.
async fn get_compliance_instance(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ComplianceInstanceRepository::new(state.pool.clone());

    match repo.find_by_id(org_id, id).await? {
        Some(record) => Ok((StatusCode::OK, Json(record))),
        None => Err(ApiError::NotFound("Compliance instance not found".to_string())),
    }
}

/// Partially update a compliance instance and record the change in the audit log.
async fn update_compliance_instance(
    State(state): State<AppState>,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateComplianceInstanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let changes = request.changes()?;

    let repo = ComplianceInstanceRepository::new(state.pool.clone());
    let ComplianceInstanceUpdate { before, after } = repo
        .update(org_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Compliance instance not found".to_string()))?;

    if record_snapshot(&before) != record_snapshot(&after) {
        let mut audit = audit_helpers::compliance_instance_updated(org_id, &before, &after);
        if let Some(Extension(RequestId(rid))) = request_id {
            audit = audit.with_request_id(rid);
        }
        if let Some(ip) = client_ip(&headers) {
            audit = audit.with_ip(ip);
        }
        if let Some(ua) = user_agent(&headers) {
            audit = audit.with_user_agent(ua);
        }
        let input = audit.build();

        info!(
            organization_id = %org_id,
            compliance_instance_id = %id,
            action = %input.action,
            "Updated compliance instance"
        );
        AuditLogRepository::new(state.pool.clone()).insert_async(input);
    }

    Ok((StatusCode::OK, Json(after)))
}
