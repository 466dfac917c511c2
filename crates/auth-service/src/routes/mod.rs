//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::handlers::{self, admin_handler, auth_handler};
use crate::middleware::{http_metrics_middleware, require_admin, require_auth};
use crate::services::AuthService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

/// Build the application routes.
///
/// - `/health`, `/metrics` - public, unversioned
/// - `/api/v1/auth/{login,register,refresh}` - public
/// - `/api/v1/auth/{me,password}` - bearer token required
/// - `/api/v1/admin/users/:id/roles` - bearer token with `admin` role
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/auth/login", post(auth_handler::handle_login))
        .route("/api/v1/auth/register", post(auth_handler::handle_register))
        .route("/api/v1/auth/refresh", post(auth_handler::handle_refresh))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth_handler::handle_me))
        .route(
            "/api/v1/auth/password",
            post(auth_handler::handle_change_password),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    // route_layer order: require_auth (added last) runs first
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/users/:id/roles",
            post(admin_handler::handle_grant_role),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware (outermost, sees every response)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
