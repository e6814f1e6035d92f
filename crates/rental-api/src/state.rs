//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use rental_auth::JwtDecoder;
use rental_core::config::AppConfig;
use rental_database::BookingStore;
use rental_service::BookingService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Booking persistence
    pub store: Arc<dyn BookingStore>,
    /// Booking lifecycle service
    pub booking_service: Arc<BookingService>,
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,
}

impl AppState {
    /// Wires the service layer over `store`.
    pub fn new(config: AppConfig, store: Arc<dyn BookingStore>) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let booking_service = Arc::new(BookingService::new(Arc::clone(&store)));
        Self {
            config: Arc::new(config),
            store,
            booking_service,
            jwt_decoder,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("jwt_decoder", &self.jwt_decoder)
            .finish_non_exhaustive()
    }
}
