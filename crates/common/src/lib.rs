//! Common utilities and types shared across the archive auth crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, header inspection, expiry checks)
pub mod jwt;
