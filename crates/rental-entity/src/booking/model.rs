//! Booking entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rental_core::types::id::{BookingId, CustomerId, VehicleId};

use super::period::BookingPeriod;
use super::status::BookingStatus;

/// A customer's reservation of one vehicle over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Customer who owns the booking.
    pub customer_id: CustomerId,
    /// Reserved vehicle.
    pub vehicle_id: VehicleId,
    /// Inclusive start of the reservation.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the reservation.
    pub end_date: DateTime<Utc>,
    /// Rental price for the period.
    pub total_amount: Decimal,
    /// Deposit due, 20% of the total.
    pub deposit_amount: Decimal,
    /// Whether the deposit has been received.
    pub deposit_paid: bool,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Free-form customer notes.
    pub notes: Option<String>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Customer placing the booking.
    pub customer_id: CustomerId,
    /// Vehicle to reserve.
    pub vehicle_id: VehicleId,
    /// Reservation period.
    pub period: BookingPeriod,
    /// Quoted total.
    pub total_amount: Decimal,
    /// Quoted deposit.
    pub deposit_amount: Decimal,
    /// Customer notes.
    pub notes: Option<String>,
}

impl Booking {
    /// Materialize a new pending booking.
    pub fn pending(data: NewBooking, now: DateTime<Utc>) -> Self {
        Self {
            id: BookingId::new(),
            customer_id: data.customer_id,
            vehicle_id: data.vehicle_id,
            start_date: data.period.start(),
            end_date: data.period.end(),
            total_amount: data.total_amount,
            deposit_amount: data.deposit_amount,
            deposit_paid: false,
            status: BookingStatus::Pending,
            notes: data.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// The reserved interval.
    ///
    /// Rows are constrained to `start_date < end_date`; a row violating that
    /// degenerates to an instant that overlaps nothing.
    pub fn period(&self) -> Option<BookingPeriod> {
        BookingPeriod::new(self.start_date, self.end_date).ok()
    }

    /// Whether this booking reserves `vehicle_id` at any point of `period`.
    pub fn blocks(&self, vehicle_id: VehicleId, period: &BookingPeriod) -> bool {
        self.vehicle_id == vehicle_id
            && self.status.holds_vehicle()
            && self.period().is_some_and(|own| own.overlaps(period))
    }

    /// Whole days between start and end, rounded down. Zero for sub-day rentals.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Active status and `start_date <= now <= end_date`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Active && self.period().is_some_and(|p| p.spans(now))
    }

    /// Active status and already past its end date.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Active && self.end_date < now
    }
}
