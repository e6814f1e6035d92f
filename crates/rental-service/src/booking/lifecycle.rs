//! Booking lifecycle state machine and its vehicle side effects.
//!
//! ```text
//!   pending ──► confirmed ──► active ──► completed
//!      │            │           │
//!      └────────────┴───────────┴──────► cancelled
//! ```
//!
//! Any status may be cancelled. Moving a booking into `confirmed` marks
//! the vehicle rented; cancelling (or deleting) marks it available again.
//! Completion leaves the vehicle status untouched.

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_entity::booking::BookingStatus;
use rental_entity::vehicle::VehicleStatus;

/// What a transition does to the booked vehicle's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleEffect {
    /// Leave the vehicle as it is.
    Keep,
    /// Set the vehicle to `rented`.
    MarkRented,
    /// Set the vehicle to `available`.
    Release,
}

impl VehicleEffect {
    /// The vehicle status to write, if any.
    pub fn vehicle_status(&self) -> Option<VehicleStatus> {
        match self {
            Self::Keep => None,
            Self::MarkRented => Some(VehicleStatus::Rented),
            Self::Release => Some(VehicleStatus::Available),
        }
    }
}

/// Whether `from -> to` is a legal transition.
pub fn is_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;

    match to {
        Cancelled => true,
        Pending => from == Pending,
        Confirmed => matches!(from, Pending | Confirmed),
        Active => matches!(from, Confirmed | Active),
        Completed => matches!(from, Confirmed | Active),
    }
}

/// Side effect of entering `to`.
pub fn effect_of(to: BookingStatus) -> VehicleEffect {
    match to {
        BookingStatus::Confirmed => VehicleEffect::MarkRented,
        BookingStatus::Cancelled => VehicleEffect::Release,
        _ => VehicleEffect::Keep,
    }
}

/// Validate `from -> to` and return its side effect.
pub fn plan(from: BookingStatus, to: BookingStatus) -> AppResult<VehicleEffect> {
    if !is_allowed(from, to) {
        return Err(AppError::invalid_field(
            "status",
            format!("Cannot change booking status from {from} to {to}."),
        ));
    }
    Ok(effect_of(to))
}
