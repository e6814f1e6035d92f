//! JWT claims carried by customer access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rental_core::types::id::CustomerId;

/// Claims payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the customer ID.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims for `customer_id` valid from `issued_at` for `ttl`.
    pub fn new(customer_id: CustomerId, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub: customer_id.into_uuid(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// The customer the token was issued to.
    pub fn customer_id(&self) -> CustomerId {
        CustomerId::from_uuid(self.sub)
    }
}
