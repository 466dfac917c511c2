//! HTTP middleware for the auth service.
//!
//! - `auth` - bearer authentication and admin role gating
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::{require_admin, require_auth};
pub use http_metrics::http_metrics_middleware;
