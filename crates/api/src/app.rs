use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use shared::pagination::PageRequest;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{audit_logs, compliance_instances, dashboard, health};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Normalize paging parameters with the configured limits.
    pub fn page_request(&self, page: Option<i64>, per_page: Option<i64>) -> PageRequest {
        let limits = &self.config.limits;
        PageRequest::with_limits(page, per_page, limits.default_per_page, limits.max_per_page)
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Tenant-scoped routes
    let organization_routes = Router::new()
        .nest(
            "/api/v1/organizations/:org_id/compliance-instances",
            compliance_instances::router(),
        )
        .nest(
            "/api/v1/organizations/:org_id/audit-logs",
            audit_logs::router(),
        )
        .route(
            "/api/v1/organizations/:org_id/dashboard/rag-summary",
            get(dashboard::get_rag_summary),
        );

    // Stateless computations over client-supplied data
    let compute_routes = Router::new()
        .route("/api/v1/dashboard/rag-summary", post(dashboard::post_rag_summary))
        .route("/api/v1/audit-logs/diff", post(audit_logs::diff_snapshots));

    Router::new()
        .merge(public_routes)
        .merge(organization_routes)
        .merge(compute_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            config.security.hsts_enabled,
            security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
