//! Domain models for Compliance OS.

pub mod audit_log;
pub mod compliance;
pub mod dashboard;

pub use audit_log::*;
pub use compliance::*;
pub use dashboard::*;
