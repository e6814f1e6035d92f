//! Request context carrying the authenticated customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rental_core::types::id::CustomerId;

/// Context for the current authenticated request.
///
/// Built from the verified bearer token and passed into every service
/// method so each operation knows *who* is acting and *when*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated customer.
    pub customer_id: CustomerId,
    /// When the request was received. All "now" comparisons use this.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(customer_id: CustomerId) -> Self {
        Self::at(customer_id, Utc::now())
    }

    /// Creates a context with an explicit request time.
    pub fn at(customer_id: CustomerId, request_time: DateTime<Utc>) -> Self {
        Self {
            customer_id,
            request_time,
        }
    }
}
