//! Vehicle status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability state of a vehicle as tracked by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    /// Free to be booked.
    Available,
    /// Reserved by a confirmed booking.
    Rented,
    /// Out of service for maintenance.
    Maintenance,
    /// Withdrawn from the fleet.
    Unavailable,
}

impl VehicleStatus {
    /// Whether new bookings may be placed against the vehicle.
    ///
    /// `Rented` is still bookable: it only reflects that some confirmed
    /// booking exists, and date-level admission is decided by the overlap
    /// check.
    ///
    /// Open product question: the creation rule says a vehicle must be
    /// `available`, yet a later non-overlapping booking on a vehicle that a
    /// confirmed booking already marked `rented` has to succeed. Both cannot
    /// hold; this admits `rented` until the rule is settled.
    pub fn accepts_bookings(&self) -> bool {
        matches!(self, Self::Available | Self::Rented)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
