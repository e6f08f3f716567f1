//! Dashboard RAG summary routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_rag_aggregation;
use domain::models::{ComplianceInstanceQuery, RagSummary, RagSummaryRequest, RagSummaryResponse};
use domain::services::{aggregate, aggregate_values};
use persistence::repositories::ComplianceInstanceRepository;

fn observed(summary: RagSummary) -> RagSummary {
    record_rag_aggregation(summary.total, summary.skipped);
    summary
}

/// GET /api/v1/organizations/:org_id/dashboard/rag-summary
///
/// RAG summary over the organization's stored compliance instances.
/// Accepts the same filters as the list endpoint; paging parameters are ignored.
pub async fn get_rag_summary(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    query: Result<Query<ComplianceInstanceQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let filters = query.filters()?;
    let max_records = state.config.limits.max_dashboard_records;

    let repo = ComplianceInstanceRepository::new(state.pool.clone());
    let records = repo.list_all(org_id, &filters, max_records as i64).await?;
    if records.len() >= max_records {
        warn!(
            organization_id = %org_id,
            max_records = max_records,
            "RAG summary reached the record limit and may be incomplete"
        );
    }

    let summary = observed(aggregate(&records));

    info!(
        organization_id = %org_id,
        total = summary.total,
        skipped = summary.skipped,
        categories = summary.by_category.len(),
        "Computed RAG summary"
    );

    Ok((StatusCode::OK, Json(RagSummaryResponse::new(summary))))
}

/// POST /api/v1/dashboard/rag-summary
///
/// RAG summary over records supplied in the request body. Entries that
/// cannot be read as records are counted in `skipped`.
pub async fn post_rag_summary(
    State(state): State<AppState>,
    payload: Result<Json<RagSummaryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let max_records = state.config.limits.max_dashboard_records;

    if request.records.len() > max_records {
        return Err(ApiError::validation(format!(
            "At most {} records can be summarized per request",
            max_records
        )));
    }

    let summary = observed(aggregate_values(&request.records));

    info!(
        records = request.records.len(),
        total = summary.total,
        skipped = summary.skipped,
        "Computed RAG summary for posted records"
    );

    Ok((StatusCode::OK, Json(RagSummaryResponse::new(summary))))
}
