//! Persistence layer for the Compliance OS backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Query timing metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
