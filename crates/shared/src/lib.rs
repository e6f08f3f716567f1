//! Shared utilities and common types for the Compliance OS backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Page-based pagination (request clamping, page metadata)
//! - Common validation logic

pub mod pagination;
pub mod validation;
