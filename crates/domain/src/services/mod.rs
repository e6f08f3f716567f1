//! Domain services for Compliance OS.
//!
//! Services contain business logic that operates on domain models.

pub mod audit;
pub mod audit_diff;
pub mod rag_aggregator;

pub use audit::{audit_helpers, record_snapshot, AuditLogBuilder};
pub use audit_diff::{diff, diff_from_json};
pub use rag_aggregator::{aggregate, aggregate_values};
