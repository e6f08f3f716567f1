//! HTTP route handlers.

pub mod audit_logs;
pub mod compliance_instances;
pub mod dashboard;
pub mod health;

use axum::http::{header, HeaderMap};
use std::net::IpAddr;

/// Client address as reported by the first `X-Forwarded-For` hop.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
}

pub(crate) fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
