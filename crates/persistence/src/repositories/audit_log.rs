//! Audit log repository for database operations.

use domain::models::{
    ActorType, AuditActor, AuditLog, AuditMetadata, AuditResource, CreateAuditLogInput,
    ListAuditLogsQuery, Snapshot,
};
use serde_json::Value as JsonValue;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

const SELECT_COLUMNS: &str = "id, organization_id, timestamp, actor_id, actor_type, actor_email, \
     action, resource_type, resource_id, resource_name, old_values, new_values, metadata, \
     ip_address::text, user_agent, created_at";

/// Helper struct for building dynamic WHERE clauses from audit log filters.
/// Tracks conditions and parameter positions so count and list stay in sync.
struct AuditLogFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl AuditLogFilterBuilder {
    fn build(query: &ListAuditLogsQuery) -> Self {
        let mut conditions = vec!["organization_id = $1".to_string()];
        let mut param_count = 1;

        if query.actor_id.is_some() {
            param_count += 1;
            conditions.push(format!("actor_id = ${}", param_count));
        }

        if query.action.is_some() {
            param_count += 1;
            conditions.push(format!("action = ${}", param_count));
        }

        if query.resource_type.is_some() {
            param_count += 1;
            conditions.push(format!("resource_type = ${}", param_count));
        }

        if query.resource_id.is_some() {
            param_count += 1;
            conditions.push(format!("resource_id = ${}", param_count));
        }

        if query.from.is_some() {
            param_count += 1;
            conditions.push(format!("timestamp >= ${}", param_count));
        }

        if query.to.is_some() {
            param_count += 1;
            conditions.push(format!("timestamp <= ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Binds optional query filters in the order `AuditLogFilterBuilder` numbers them.
macro_rules! bind_query_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref actor_id) = $query.actor_id {
            b = b.bind(actor_id);
        }
        if let Some(ref action) = $query.action {
            b = b.bind(action);
        }
        if let Some(ref resource_type) = $query.resource_type {
            b = b.bind(resource_type);
        }
        if let Some(ref resource_id) = $query.resource_id {
            b = b.bind(resource_id);
        }
        if let Some(ref from) = $query.from {
            b = b.bind(from);
        }
        if let Some(ref to) = $query.to {
            b = b.bind(to);
        }
        b
    }};
}

/// Repository for audit log database operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new audit log entry.
    pub async fn insert(&self, input: CreateAuditLogInput) -> Result<AuditLog, sqlx::Error> {
        let timer = QueryTimer::new("insert_audit_log");
        let metadata_json = input.request_id.as_ref().map(|request_id| {
            serde_json::json!({ "request_id": request_id })
        });

        let query = format!(
            r#"
            INSERT INTO audit_logs (
                organization_id, actor_id, actor_type, actor_email, action,
                resource_type, resource_id, resource_name, old_values, new_values,
                metadata, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12::inet, $13)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );
        let entity = sqlx::query_as::<_, AuditLogEntity>(&query)
            .bind(input.organization_id)
            .bind(input.actor_id)
            .bind(input.actor_type.to_string())
            .bind(&input.actor_email)
            .bind(input.action.to_string())
            .bind(&input.resource_type)
            .bind(&input.resource_id)
            .bind(&input.resource_name)
            .bind(input.old_values.map(JsonValue::Object))
            .bind(input.new_values.map(JsonValue::Object))
            .bind(metadata_json)
            .bind(input.ip_address.map(|ip| ip.to_string()))
            .bind(&input.user_agent)
            .fetch_one(&self.pool)
            .await?;
        timer.record();

        Ok(entity_to_domain(entity))
    }

    /// Insert an audit log entry without waiting for the result.
    ///
    /// Failures are logged and otherwise dropped.
    pub fn insert_async(&self, input: CreateAuditLogInput) {
        let repo = self.clone();
        tokio::spawn(async move {
            let action = input.action;
            if let Err(e) = repo.insert(input).await {
                tracing::error!(action = %action, error = %e, "Failed to insert audit log");
            }
        });
    }

    /// Find audit log by ID.
    pub async fn find_by_id(&self, org_id: Uuid, id: Uuid) -> Result<Option<AuditLog>, sqlx::Error> {
        let timer = QueryTimer::new("find_audit_log");
        let query = format!(
            "SELECT {} FROM audit_logs WHERE id = $1 AND organization_id = $2",
            SELECT_COLUMNS
        );
        let entity = sqlx::query_as::<_, AuditLogEntity>(&query)
            .bind(id)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await?;
        timer.record();

        Ok(entity.map(entity_to_domain))
    }

    /// List audit logs with pagination and filtering, newest first.
    pub async fn list(
        &self,
        org_id: Uuid,
        query: &ListAuditLogsQuery,
        page: PageRequest,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_audit_logs");
        let filter = AuditLogFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM audit_logs WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(org_id);
        let count_builder = bind_query_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM audit_logs
            WHERE {}
            ORDER BY timestamp DESC, id DESC
            LIMIT ${} OFFSET ${}
            "#,
            SELECT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );
        let list_builder = sqlx::query_as::<_, AuditLogEntity>(&list_query).bind(org_id);
        let list_builder = bind_query_filters!(list_builder, query);
        let entities = list_builder
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        timer.record();

        Ok((entities.into_iter().map(entity_to_domain).collect(), total))
    }
}

/// Stored snapshots are JSON objects; anything else reads back as no snapshot.
fn snapshot_from_json(value: Option<JsonValue>) -> Option<Snapshot> {
    match value {
        Some(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: AuditLogEntity) -> AuditLog {
    let actor_type = entity
        .actor_type
        .parse::<ActorType>()
        .unwrap_or(ActorType::System);

    let request_id = entity
        .metadata
        .as_ref()
        .and_then(|m| m.get("request_id"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let metadata = if entity.ip_address.is_some() || entity.user_agent.is_some() || request_id.is_some() {
        Some(AuditMetadata {
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            request_id,
        })
    } else {
        None
    };

    AuditLog {
        id: entity.id,
        organization_id: entity.organization_id,
        timestamp: entity.timestamp,
        actor: AuditActor {
            id: entity.actor_id,
            actor_type,
            email: entity.actor_email,
        },
        action: entity.action,
        resource: AuditResource {
            resource_type: entity.resource_type,
            id: entity.resource_id,
            name: entity.resource_name,
        },
        old_values: snapshot_from_json(entity.old_values),
        new_values: snapshot_from_json(entity.new_values),
        metadata,
    }
}
