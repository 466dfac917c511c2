//! Metrics for the auth service.
//!
//! Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `flow`: login, refresh
//! - `status`: success, error
//! - `error_category`: authentication, authorization, cryptographic, internal
//! - `path`: normalized against the route table

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token pair issuance duration and outcome
///
/// Metric: `auth_token_issuance_duration_seconds`, `auth_token_issuance_total`
/// Labels: `flow`, `status`
pub fn record_token_issuance(flow: &str, status: &str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "flow" => flow.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "flow" => flow.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record access token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a refused rotation.
///
/// Metric: `auth_refresh_denials_total`
///
/// Unlabeled: `/metrics` is public, and a per-reason series would tell a
/// caller which rotation check failed. The reason is only logged.
pub fn record_refresh_denial() {
    counter!("auth_refresh_denials_total").increment(1);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record bcrypt operation duration
///
/// Metric: `auth_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("auth_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `auth_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("auth_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `auth_http_requests_total`, `auth_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Captures framework-level rejections too (415, 400 on JSON parse, 404, 405).
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("auth_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Map a request path onto a bounded label.
fn normalize_path(path: &str) -> String {
    match path {
        "/health" | "/metrics" | "/api/v1/auth/login" | "/api/v1/auth/register"
        | "/api/v1/auth/refresh" | "/api/v1/auth/me" | "/api/v1/auth/password" => {
            path.to_string()
        }
        _ => normalize_dynamic_path(path),
    }
}

/// `/api/v1/admin/users/{uuid}/roles` → `/api/v1/admin/users/{id}/roles`
fn normalize_dynamic_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("/api/v1/admin/users/") {
        if let Some((id, "roles")) = rest.split_once('/') {
            if uuid::Uuid::parse_str(id).is_ok() {
                return "/api/v1/admin/users/{id}/roles".to_string();
            }
        }
    }

    "/other".to_string()
}
