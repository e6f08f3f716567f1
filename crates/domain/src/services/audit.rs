//! Audit logging helpers for tracking system actions.
//!
//! Provides a fluent builder for creating audit log entries from route
//! handlers, plus a ready-made entry for compliance instance edits.

use serde_json::Value as JsonValue;
use std::net::IpAddr;
use uuid::Uuid;

use crate::models::{AuditAction, ComplianceRecord, CreateAuditLogInput, Snapshot};

/// Builder for creating audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
    input: CreateAuditLogInput,
}

impl AuditLogBuilder {
    /// Create a new audit log builder for a system action.
    pub fn system_action(org_id: Uuid, action: AuditAction) -> Self {
        Self {
            input: CreateAuditLogInput::new(org_id, action, String::new()),
        }
    }

    /// Set the resource being acted upon.
    pub fn on_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.input.resource_type = resource_type.into();
        self.input.resource_id = Some(resource_id.into());
        self
    }

    /// Set the resource name.
    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.input.resource_name = Some(name.into());
        self
    }

    /// Attach the before/after state of the resource.
    pub fn with_snapshots(mut self, old: Option<Snapshot>, new: Option<Snapshot>) -> Self {
        self.input.old_values = old;
        self.input.new_values = new;
        self
    }

    /// Set the client IP address.
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.input.ip_address = Some(ip);
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.input.user_agent = Some(ua.into());
        self
    }

    /// Set the request ID for tracing.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.input.request_id = Some(id.into());
        self
    }

    /// Build the CreateAuditLogInput.
    pub fn build(self) -> CreateAuditLogInput {
        self.input
    }
}

/// Snapshot of a compliance record for audit purposes.
///
/// Timestamps and the tenant id are left out; they are carried by the
/// audit entry itself.
pub fn record_snapshot(record: &ComplianceRecord) -> Snapshot {
    let mut snapshot = match serde_json::to_value(record) {
        Ok(JsonValue::Object(map)) => map,
        _ => Snapshot::new(),
    };
    for key in ["organization_id", "created_at", "updated_at"] {
        snapshot.remove(key);
    }
    snapshot
}

/// Convenience functions for common audit log patterns.
pub mod audit_helpers {
    use super::*;

    const RESOURCE_TYPE: &str = "compliance_instance";

    /// Audit entry for an edited compliance instance, attributed to the
    /// system actor. Request context is added by the caller.
    ///
    /// Recorded as a status change when only the workflow status moved.
    pub fn compliance_instance_updated(
        org_id: Uuid,
        before: &ComplianceRecord,
        after: &ComplianceRecord,
    ) -> AuditLogBuilder {
        let only_status_changed = before.status != after.status
            && ComplianceRecord {
                status: before.status.clone(),
                updated_at: before.updated_at,
                ..after.clone()
            } == *before;
        let action = if only_status_changed {
            AuditAction::ComplianceInstanceStatusChange
        } else {
            AuditAction::ComplianceInstanceUpdate
        };

        AuditLogBuilder::system_action(org_id, action)
            .on_resource(RESOURCE_TYPE, after.id.clone())
            .with_resource_name(after.title.clone())
            .with_snapshots(Some(record_snapshot(before)), Some(record_snapshot(after)))
    }
}
