//! JWT service for token generation and validation
//!
//! Tokens are signed with HS256 using a shared secret, so the auth service
//! that issues them and the API service that checks them only need the same
//! `JWT_SECRET`.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

/// Default token lifetime: 30 days
const DEFAULT_TOKEN_EXPIRY: u64 = 30 * 24 * 60 * 60;

/// Shortest accepted signing secret, in bytes
const MIN_SECRET_LEN: usize = 32;

/// Errors raised while configuring, issuing or validating tokens
#[derive(Debug, Error)]
pub enum JwtError {
    /// Missing or unusable configuration
    #[error("JWT configuration error: {0}")]
    Configuration(String),

    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Token is malformed or its signature does not match
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Signing failed
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: String,
    /// Token expiration time in seconds (default: 30 days)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret, at least 32 bytes (required)
    /// - `JWT_EXPIRY_SECONDS`: Token expiry in seconds (default: 2592000)
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| {
            JwtError::Configuration("JWT_SECRET environment variable not set".to_string())
        })?;

        let token_expiry = std::env::var("JWT_EXPIRY_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        let config = JwtConfig {
            secret,
            token_expiry,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), JwtError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::Configuration(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        Ok(())
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Role at the time the token was issued
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, JwtError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_expiry: config.token_expiry,
        })
    }

    /// Generate a token for a user
    pub fn generate_token(&self, user_id: Uuid, role: Role) -> Result<String, JwtError> {
        let now = now_secs()?;

        let claims = Claims {
            sub: user_id,
            role,
            iat: now,
            exp: now + self.token_expiry,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}

fn now_secs() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| JwtError::Signing(format!("Failed to get current time: {}", e)))
}
