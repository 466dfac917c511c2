//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used throughout the auth service for
//! passwords, refresh tokens and the HMAC signing key.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct that derives `Debug` while holding one of them is safe to log.
//! Values are zeroized on drop.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     username: "alice".to_string(),
//!     password: SecretString::from("CorrectPass1!"),
//! };
//!
//! assert!(!format!("{req:?}").contains("CorrectPass1!"));
//! assert_eq!(req.password.expose_secret(), "CorrectPass1!");
//! ```
//!
//! Use `SecretString` for passwords and refresh tokens travelling through
//! request bodies, and [`SecretBytes`] for raw key material.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// Binary key material (e.g. the decoded JWT signing secret).
pub type SecretBytes = SecretBox<Vec<u8>>;

/// Wrap raw bytes as [`SecretBytes`].
#[must_use]
pub fn secret_bytes(bytes: Vec<u8>) -> SecretBytes {
    SecretBox::new(Box::new(bytes))
}
