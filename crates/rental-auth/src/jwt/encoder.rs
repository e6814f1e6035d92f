//! JWT token minting.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use rental_core::config::AuthConfig;
use rental_core::error::{AppError, ErrorKind};
use rental_core::types::id::CustomerId;

use super::claims::Claims;

/// Signs access tokens with the shared HMAC secret.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").field("ttl", &self.ttl).finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
        }
    }

    /// Issues a token for `customer_id` using the configured lifetime.
    pub fn issue(&self, customer_id: CustomerId) -> Result<String, AppError> {
        self.encode(&Claims::new(customer_id, Utc::now(), self.ttl))
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to sign token", e))
    }
}
