//! Booking store contract.
//!
//! Every admission decision runs inside a [`BookingUnitOfWork`]: the unit
//! holds the write lock of each vehicle it was opened for, so the overlap
//! check, the booking write, and the vehicle status side effect commit
//! together or not at all. Dropping a unit without calling
//! [`commit`](BookingUnitOfWork::commit) discards every staged change.
//!
//! Two implementations are provided:
//! - PostgreSQL (one transaction per unit, vehicle rows locked `FOR UPDATE`)
//! - In-memory (using `tokio::sync::Mutex`)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_core::types::id::{BookingId, CustomerId, VehicleId};
use rental_core::types::pagination::{PageRequest, PageResponse};
use rental_entity::booking::{Booking, BookingPeriod, BookingStatus};
use rental_entity::vehicle::{Vehicle, VehicleStatus};

/// Filters for listing a customer's bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings in this status.
    pub status: Option<BookingStatus>,
    /// Only bookings for this vehicle.
    pub vehicle_id: Option<VehicleId>,
    /// Only bookings starting on or after this day (UTC).
    pub from: Option<NaiveDate>,
    /// Only bookings ending on or before this day (UTC).
    pub to: Option<NaiveDate>,
}

impl BookingFilter {
    /// Whether `booking` passes every set criterion.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.is_none_or(|s| booking.status == s)
            && self.vehicle_id.is_none_or(|v| booking.vehicle_id == v)
            && self.from.is_none_or(|d| booking.start_date.date_naive() >= d)
            && self.to.is_none_or(|d| booking.end_date.date_naive() <= d)
    }
}

/// Vehicle lookups and status writes, as seen from inside a unit of work.
#[async_trait]
pub trait VehicleRegistry: Send {
    /// Fetch a vehicle, failing with `NotFound` if it does not exist.
    async fn get_vehicle(&mut self, id: VehicleId) -> AppResult<Vehicle>;

    /// Overwrite a vehicle's status.
    async fn set_status(&mut self, id: VehicleId, status: VehicleStatus) -> AppResult<()>;

    /// Price per day of a vehicle.
    async fn get_daily_rate(&mut self, id: VehicleId) -> AppResult<Decimal> {
        Ok(self.get_vehicle(id).await?.daily_rate)
    }

    /// Current status of a vehicle.
    async fn get_status(&mut self, id: VehicleId) -> AppResult<VehicleStatus> {
        Ok(self.get_vehicle(id).await?.status)
    }
}

/// An open atomic unit over bookings and the vehicles it locked.
#[async_trait]
pub trait BookingUnitOfWork: VehicleRegistry {
    /// Re-read a booking under the unit's locks.
    async fn find_booking(&mut self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Confirmed or active bookings of `vehicle_id` whose period overlaps
    /// `period`, ignoring `exclude`.
    async fn find_conflicting(
        &mut self,
        vehicle_id: VehicleId,
        period: &BookingPeriod,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>>;

    /// Stage a new booking.
    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<()>;

    /// Stage a full overwrite of an existing booking.
    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()>;

    /// Stage removal of a booking. Returns whether it existed.
    async fn delete_booking(&mut self, id: BookingId) -> AppResult<bool>;

    /// Publish every staged change atomically and release the locks.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Entry point to booking persistence.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Open a unit of work holding the write lock of every listed vehicle.
    ///
    /// Locks are taken in ascending id order; duplicates are ignored.
    async fn begin(&self, vehicles: &[VehicleId]) -> AppResult<Box<dyn BookingUnitOfWork>>;

    /// Read a booking outside any unit of work.
    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Read a vehicle outside any unit of work.
    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>>;

    /// A customer's bookings, newest first.
    async fn list_bookings(
        &self,
        customer_id: CustomerId,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Sorted, de-duplicated lock order for a set of vehicles.
pub(crate) fn lock_order(vehicles: &[VehicleId]) -> Vec<VehicleId> {
    let mut ordered = vehicles.to_vec();
    ordered.sort();
    ordered.dedup();
    ordered
}

pub(crate) fn vehicle_not_found(id: VehicleId) -> AppError {
    AppError::not_found(format!("Vehicle {id} not found"))
}
