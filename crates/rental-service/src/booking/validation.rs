//! Input checks that run before any booking is written.

use chrono::{DateTime, Utc};

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_entity::booking::BookingPeriod;
use rental_entity::vehicle::Vehicle;

/// Check a requested period against the clock.
///
/// The start must lie strictly after `now` and the end strictly after the
/// start. The start is checked first.
pub fn validate_period(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<BookingPeriod> {
    if start <= now {
        return Err(AppError::invalid_field(
            "start_date",
            "Start date must be in the future.",
        ));
    }
    BookingPeriod::new(start, end)
}

/// Reject vehicles the registry has taken out of service.
pub fn ensure_bookable(vehicle: &Vehicle) -> AppResult<()> {
    if vehicle.status.accepts_bookings() {
        return Ok(());
    }
    Err(AppError::conflict(format!(
        "Vehicle {} is not available for booking (status: {}).",
        vehicle.id, vehicle.status
    ))
    .on_field("vehicle"))
}
