//! Repository implementations for database operations.

pub mod audit_log;
pub mod compliance_instance;

pub use audit_log::AuditLogRepository;
pub use compliance_instance::{ComplianceInstanceRepository, ComplianceInstanceUpdate};
