use crate::crypto::JwtSecret;
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default access token lifetime in minutes.
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 30;

/// Default refresh token lifetime in days.
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

/// Default bcrypt cost factor (~200ms per hash on current hardware).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum bcrypt cost accepted for password hashing.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum bcrypt cost accepted for password hashing.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum decoded length of the HMAC signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

const MAX_ACCESS_TOKEN_MINUTES: i64 = 24 * 60;
const MAX_REFRESH_TOKEN_DAYS: i64 = 90;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// HMAC-SHA256 key for access tokens. Loaded once; never re-read per request.
    pub jwt_secret: JwtSecret,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidSecretKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8082".to_string());

        let secret_base64 = vars
            .get("AUTH_JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_JWT_SECRET".to_string()))?;

        let secret_bytes = general_purpose::STANDARD
            .decode(secret_base64.trim())
            .map_err(ConfigError::Base64Error)?;

        if secret_bytes.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidSecretKey(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                secret_bytes.len()
            )));
        }

        let jwt_secret = JwtSecret::new(secret_bytes)?;

        let access_token_minutes = parse_bounded(
            vars,
            "ACCESS_TOKEN_MINUTES",
            DEFAULT_ACCESS_TOKEN_MINUTES,
            1,
            MAX_ACCESS_TOKEN_MINUTES,
        )?;

        let refresh_token_days = parse_bounded(
            vars,
            "REFRESH_TOKEN_DAYS",
            DEFAULT_REFRESH_TOKEN_DAYS,
            1,
            MAX_REFRESH_TOKEN_DAYS,
        )?;

        let bcrypt_cost = parse_bounded(
            vars,
            "BCRYPT_COST",
            i64::from(DEFAULT_BCRYPT_COST),
            i64::from(MIN_BCRYPT_COST),
            i64::from(MAX_BCRYPT_COST),
        )?;
        // Bounded to MIN..=MAX_BCRYPT_COST above
        let bcrypt_cost = u32::try_from(bcrypt_cost).map_err(|e| ConfigError::InvalidValue {
            name: "BCRYPT_COST".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            access_token_minutes,
            refresh_token_days,
            bcrypt_cost,
        })
    }
}

fn parse_bounded(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("'{}' is not an integer", raw),
    })?;

    if !(min..=max).contains(&value) {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be between {} and {}, got {}", min, max, value),
        });
    }

    Ok(value)
}
