//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit_log;
pub mod compliance_instance;

pub use audit_log::AuditLogEntity;
pub use compliance_instance::ComplianceInstanceEntity;
