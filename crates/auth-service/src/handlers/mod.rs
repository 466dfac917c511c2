//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod health;
pub mod metrics;

pub use health::health_check;
pub use metrics::metrics_handler;
