//! Shared test helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use rental_api::{AppState, build_app};
use rental_auth::JwtEncoder;
use rental_core::config::AppConfig;
use rental_core::types::id::{CustomerId, VehicleId};
use rental_database::MemoryBookingStore;
use rental_entity::vehicle::{Vehicle, VehicleStatus};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: Arc<MemoryBookingStore>,
    /// Token minting with the app's secret
    pub encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let store = Arc::new(MemoryBookingStore::new());
        let encoder = JwtEncoder::new(&config.auth);
        let router = build_app(AppState::new(config, store.clone()));

        Self {
            router,
            store,
            encoder,
        }
    }

    /// Register a vehicle and return its id
    pub async fn add_vehicle(&self, daily_rate: Decimal) -> VehicleId {
        let plate = format!("T-{}", &Uuid::new_v4().simple().to_string()[..6]);
        let vehicle = Vehicle::new(Uuid::new_v4(), "Toyota", "Corolla", 2022, plate, daily_rate);
        let id = vehicle.id;
        self.store.put_vehicle(vehicle).await;
        id
    }

    /// Current status of a vehicle
    pub async fn vehicle_status(&self, id: VehicleId) -> VehicleStatus {
        use rental_database::BookingStore;
        self.store
            .find_vehicle(id)
            .await
            .expect("Failed to read vehicle")
            .expect("Vehicle missing")
            .status
    }

    /// Mint a token for a fresh customer
    pub fn token(&self) -> String {
        self.token_for(CustomerId::new())
    }

    /// Mint a token for a given customer
    pub fn token_for(&self, customer: CustomerId) -> String {
        self.encoder.issue(customer).expect("Failed to mint token")
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
}

/// RFC 3339 timestamp `days` days from now, truncated to the hour
pub fn days_from_now(days: i64) -> String {
    use chrono::{DurationRound, Utc};
    let base = Utc::now()
        .duration_trunc(chrono::Duration::hours(1))
        .expect("Failed to truncate timestamp");
    (base + chrono::Duration::days(days)).to_rfc3339()
}
