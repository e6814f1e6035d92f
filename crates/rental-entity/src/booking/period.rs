//! Half-open reservation interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rental_core::error::AppError;
use rental_core::result::AppResult;

/// The half-open interval `[start, end)` a booking reserves a vehicle for.
///
/// Always satisfies `start < end`. Two periods that merely touch
/// (`a.end == b.start`) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingPeriod {
    /// Build a period, rejecting an end that does not come after the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::invalid_field(
                "end_date",
                "End date must be after start date.",
            ));
        }
        Ok(Self { start, end })
    }

    /// Inclusive start instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && e1 > s2`.
    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whole days between start and end, rounded down. May be zero.
    pub fn whole_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `instant` falls within `start..=end`.
    pub fn spans(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
