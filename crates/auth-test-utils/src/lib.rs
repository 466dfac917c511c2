//! # Auth Test Utilities
//!
//! Shared test utilities for the auth service.
//!
//! This crate provides:
//! - Deterministic signing secrets
//! - TestTokenBuilder for forged and hand-made tokens
//! - TestAuthServer harness for E2E tests
//! - Refresh expiry manipulation
//! - Fixed test values
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let token = TestTokenBuilder::new()
//!         .for_user(TEST_USER_ALICE)
//!         .with_role("user")
//!         .expired()
//!         .sign(TEST_SECRET_SEED);
//!
//!     token.assert_valid_jwt().assert_has_role("user");
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod refresh_time;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

pub use assertions::*;
pub use crypto_fixtures::*;
pub use refresh_time::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
