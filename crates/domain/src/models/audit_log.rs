//! Audit log domain models.
//!
//! Every state-changing action on a tenant's data is recorded with the
//! before/after snapshots of the affected resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use shared::validation::validate_timestamp_range;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidationErrors;

use super::compliance::ParseLabelError;
use crate::services::audit_diff;

/// Flat key/value state of a resource.
pub type Snapshot = Map<String, JsonValue>;

/// Actor types that can perform audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// Human user.
    User,
    /// Automated system process.
    System,
    /// External API key integration.
    ApiKey,
}

impl FromStr for ActorType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(ActorType::User),
            "system" => Ok(ActorType::System),
            "api_key" => Ok(ActorType::ApiKey),
            _ => Err(ParseLabelError::new("actor type", s)),
        }
    }
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorType::User => write!(f, "user"),
            ActorType::System => write!(f, "system"),
            ActorType::ApiKey => write!(f, "api_key"),
        }
    }
}

/// Audited actions following the format: resource.operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ComplianceInstanceUpdate,
    /// Edit that only moved the workflow status.
    ComplianceInstanceStatusChange,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ComplianceInstanceUpdate => "compliance_instance.update",
            AuditAction::ComplianceInstanceStatusChange => "compliance_instance.status_change",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log entry domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditLog {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor: AuditActor,
    pub action: String,
    pub resource: AuditResource,
    pub old_values: Option<Snapshot>,
    pub new_values: Option<Snapshot>,
    pub metadata: Option<AuditMetadata>,
}

impl AuditLog {
    /// Field-by-field diff of this entry's snapshots.
    pub fn diff(&self) -> AuditDiff {
        AuditDiff::new(audit_diff::diff(
            self.old_values.as_ref(),
            self.new_values.as_ref(),
        ))
    }
}

/// Actor information for audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditActor {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    pub email: Option<String>,
}

/// Resource information for audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Request context captured with an audit log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

/// Input for creating a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLogInput {
    pub organization_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_type: ActorType,
    pub actor_email: Option<String>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub old_values: Option<Snapshot>,
    pub new_values: Option<Snapshot>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

impl CreateAuditLogInput {
    /// Create a new audit log input for a system actor.
    pub fn new(organization_id: Uuid, action: AuditAction, resource_type: impl Into<String>) -> Self {
        Self {
            organization_id,
            actor_id: None,
            actor_type: ActorType::System,
            actor_email: None,
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            resource_name: None,
            old_values: None,
            new_values: None,
            ip_address: None,
            user_agent: None,
            request_id: None,
        }
    }
}

/// Query parameters for listing audit logs.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListAuditLogsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListAuditLogsQuery {
    pub fn validate_filters(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_timestamp_range(self.from, self.to) {
            errors.add("from", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Wraps a present value so that JSON `null` stays distinguishable from a
/// missing field.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Comparison of one field across two snapshots.
///
/// A side that does not contain the key is `None` and is omitted from the
/// serialized form; a key present with JSON `null` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldDiff {
    pub key: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub old_value: Option<JsonValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub new_value: Option<JsonValue>,
    pub changed: bool,
}

/// Audit diff view-model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditDiff {
    /// False when neither snapshot carries any field; render "no change data".
    pub has_change_data: bool,
    pub changed_count: usize,
    pub fields: Vec<FieldDiff>,
}

impl AuditDiff {
    pub fn new(fields: Vec<FieldDiff>) -> Self {
        Self {
            has_change_data: !fields.is_empty(),
            changed_count: fields.iter().filter(|f| f.changed).count(),
            fields,
        }
    }
}

/// Request body for diffing two client-supplied snapshots.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditDiffRequest {
    #[serde(default, alias = "oldValues")]
    pub old_values: Option<Snapshot>,
    #[serde(default, alias = "newValues")]
    pub new_values: Option<Snapshot>,
}
