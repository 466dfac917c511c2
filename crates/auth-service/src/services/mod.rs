pub mod auth_service;
pub mod credential_verifier;
pub mod refresh_rotator;
pub mod token_issuer;
pub mod token_validator;

pub use auth_service::AuthService;
