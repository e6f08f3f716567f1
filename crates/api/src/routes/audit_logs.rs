//! Audit log routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_audit_diff;
use domain::models::{AuditDiff, AuditDiffRequest, ListAuditLogsQuery};
use domain::services::diff;
use persistence::repositories::AuditLogRepository;
use shared::pagination::Paginated;

/// Create audit logs router.
///
/// Routes:
/// - GET /api/v1/organizations/:org_id/audit-logs
/// - GET /api/v1/organizations/:org_id/audit-logs/:log_id
/// - GET /api/v1/organizations/:org_id/audit-logs/:log_id/diff
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/:log_id", get(get_audit_log))
        .route("/:log_id/diff", get(get_audit_log_diff))
}

/// List audit logs with filtering and pagination.
async fn list_audit_logs(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    query: Result<Query<ListAuditLogsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    query.validate_filters()?;
    let page = state.page_request(query.page, query.per_page);

    let repo = AuditLogRepository::new(state.pool.clone());
    let (logs, total) = repo.list(org_id, &query, page).await?;

    Ok((StatusCode::OK, Json(Paginated::new(logs, page, total))))
}

/// Get a specific audit log entry.
async fn get_audit_log(
    State(state): State<AppState>,
    Path((org_id, log_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = AuditLogRepository::new(state.pool.clone());

    match repo.find_by_id(org_id, log_id).await? {
        Some(log) => Ok((StatusCode::OK, Json(log))),
        None => Err(ApiError::NotFound("Audit log not found".to_string())),
    }
}

/// Field-by-field diff of an audit log entry's snapshots.
async fn get_audit_log_diff(
    State(state): State<AppState>,
    Path((org_id, log_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = AuditLogRepository::new(state.pool.clone());
    let log = repo
        .find_by_id(org_id, log_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Audit log not found".to_string()))?;

    let view = log.diff();
    record_audit_diff("stored");
    debug!(
        audit_log_id = %log_id,
        fields = view.fields.len(),
        changed = view.changed_count,
        "Computed audit diff"
    );

    Ok((StatusCode::OK, Json(view)))
}

/// POST /api/v1/audit-logs/diff
///
/// Diff of two snapshots supplied in the request body. Either side may be
/// missing or `null`.
pub async fn diff_snapshots(
    payload: Result<Json<AuditDiffRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let view = AuditDiff::new(diff(
        request.old_values.as_ref(),
        request.new_values.as_ref(),
    ));
    record_audit_diff("request");

    Ok((StatusCode::OK, Json(view)))
}
