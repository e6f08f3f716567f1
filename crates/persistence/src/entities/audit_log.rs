//! Audit log entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for audit logs.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    /// Unique identifier.
    pub id: Uuid,

    /// Organization this audit log belongs to.
    pub organization_id: Uuid,

    /// Timestamp when the action occurred.
    pub timestamp: DateTime<Utc>,

    /// ID of the actor who performed the action.
    pub actor_id: Option<Uuid>,

    /// Type of actor (user, system, api_key).
    pub actor_type: String,

    /// Email of the actor (for user type).
    pub actor_email: Option<String>,

    /// Action performed (format: resource.operation).
    pub action: String,

    /// Type of resource affected.
    pub resource_type: String,

    /// ID of the resource affected.
    pub resource_id: Option<String>,

    /// Name of the resource affected (for display).
    pub resource_name: Option<String>,

    /// State of the resource before the action.
    pub old_values: Option<serde_json::Value>,

    /// State of the resource after the action.
    pub new_values: Option<serde_json::Value>,

    /// Request context (request id, etc.).
    pub metadata: Option<serde_json::Value>,

    /// IP address of the request.
    pub ip_address: Option<String>,

    /// User agent of the request.
    pub user_agent: Option<String>,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,
}
