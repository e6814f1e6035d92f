//! Booking admission, pricing, lifecycle, and orchestration.

pub mod lifecycle;
pub mod overlap;
pub mod pricing;
pub mod service;
pub mod validation;

pub use lifecycle::VehicleEffect;
pub use pricing::PriceQuote;
pub use service::{BookingDetails, BookingService, CreateBookingRequest, UpdateBookingRequest};
