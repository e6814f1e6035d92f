//! Booking entity, lifecycle status, and reservation period.

pub mod model;
pub mod period;
pub mod status;

pub use model::{Booking, NewBooking};
pub use period::BookingPeriod;
pub use status::BookingStatus;
