//! Interval overlap checking for vehicle admission.

use tracing::warn;

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_core::types::id::{BookingId, VehicleId};
use rental_database::store::BookingUnitOfWork;
use rental_entity::booking::{Booking, BookingPeriod};

/// Bookings among `existing` that block `vehicle_id` during `period`.
///
/// Only confirmed or active bookings block; `exclude` lets a booking be
/// checked against everything except itself.
pub fn conflicts<'a>(
    vehicle_id: VehicleId,
    period: &BookingPeriod,
    existing: impl IntoIterator<Item = &'a Booking>,
    exclude: Option<BookingId>,
) -> Vec<&'a Booking> {
    existing
        .into_iter()
        .filter(|b| Some(b.id) != exclude && b.blocks(vehicle_id, period))
        .collect()
}

/// Whether `period` on `vehicle_id` clashes with none of `existing`.
pub fn is_admissible<'a>(
    vehicle_id: VehicleId,
    period: &BookingPeriod,
    existing: impl IntoIterator<Item = &'a Booking>,
    exclude: Option<BookingId>,
) -> bool {
    conflicts(vehicle_id, period, existing, exclude).is_empty()
}

/// Fail with `Conflict` if the unit of work sees a blocking booking.
pub async fn ensure_no_overlap(
    uow: &mut dyn BookingUnitOfWork,
    vehicle_id: VehicleId,
    period: &BookingPeriod,
    exclude: Option<BookingId>,
) -> AppResult<()> {
    let candidates = uow.find_conflicting(vehicle_id, period, exclude).await?;
    let blocking = conflicts(vehicle_id, period, &candidates, exclude);

    if let Some(first) = blocking.first() {
        warn!(
            vehicle_id = %vehicle_id,
            conflicting_booking = %first.id,
            conflicts = blocking.len(),
            start = %period.start(),
            end = %period.end(),
            "Booking rejected: vehicle already reserved"
        );
        return Err(
            AppError::conflict("Vehicle is not available for the selected dates.")
                .on_field("vehicle"),
        );
    }
    Ok(())
}
