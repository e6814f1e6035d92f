//! # rental-service
//!
//! Business logic for the rental booking core. Services take the booking
//! store as an `Arc<dyn BookingStore>` and run every admission decision
//! inside a single unit of work.

pub mod booking;
pub mod context;

pub use booking::service::BookingService;
pub use context::RequestContext;
