//! Archive auth service library
//!
//! Authenticates users of the file archive and manages the lifetime of the
//! bearer tokens that authorize their requests.
//!
//! # Modules
//!
//! - `claims` - Validated claim set, user id and role checks
//! - `config` - Service configuration
//! - `crypto` - HMAC-SHA256 access tokens, bcrypt, refresh token material
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer authentication, role gating, HTTP metrics
//! - `models` - Data models
//! - `observability` - Metrics and log correlation
//! - `repositories` - Identity store
//! - `routes` - Router and application state
//! - `services` - Token lifecycle and account operations

pub mod claims;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
