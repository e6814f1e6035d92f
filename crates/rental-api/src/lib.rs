//! # rental-api
//!
//! HTTP API layer for the rental booking service built on Axum.
//!
//! Provides the booking and health endpoints, bearer token extraction,
//! request logging and CORS middleware, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
