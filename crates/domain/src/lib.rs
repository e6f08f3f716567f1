//! Domain layer for the Compliance OS backend.
//!
//! This crate contains:
//! - Domain models (compliance records, RAG summaries, audit logs)
//! - Pure services: RAG aggregation and audit snapshot diffing
//! - Audit log builders used by the API layer

pub mod models;
pub mod services;
