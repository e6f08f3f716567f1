//! Security headers middleware.
//!
//! Adds security-related HTTP headers to all responses.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Security header names.
pub mod headers {
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const X_XSS_PROTECTION: &str = "x-xss-protection";
}

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Middleware that adds security headers to all responses.
///
/// Headers added:
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `X-XSS-Protection: 1; mode=block`
/// - `Strict-Transport-Security` when `security.hsts_enabled` is set
///
/// HSTS should only be enabled behind proper HTTPS termination.
pub async fn security_headers_middleware(
    State(hsts_enabled): State<bool>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let response_headers = response.headers_mut();

    response_headers.insert(
        header::HeaderName::from_static(headers::X_CONTENT_TYPE_OPTIONS),
        HeaderValue::from_static("nosniff"),
    );
    response_headers.insert(
        header::HeaderName::from_static(headers::X_FRAME_OPTIONS),
        HeaderValue::from_static("DENY"),
    );
    response_headers.insert(
        header::HeaderName::from_static(headers::X_XSS_PROTECTION),
        HeaderValue::from_static("1; mode=block"),
    );

    if hsts_enabled {
        response_headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}
