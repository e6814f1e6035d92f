//! Booking orchestration: create, transition, delete, and read.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_core::types::id::{BookingId, VehicleId};
use rental_core::types::pagination::{PageRequest, PageResponse};
use rental_database::store::{BookingFilter, BookingStore, BookingUnitOfWork};
use rental_entity::booking::{Booking, BookingStatus, NewBooking};
use rental_entity::vehicle::{Vehicle, VehicleStatus};

use super::lifecycle::{self, VehicleEffect};
use super::{overlap, pricing, validation};
use crate::context::RequestContext;

/// Manages the booking lifecycle and its effect on vehicle availability.
#[derive(Clone)]
pub struct BookingService {
    /// Booking store.
    store: Arc<dyn BookingStore>,
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService").finish_non_exhaustive()
    }
}

/// Request to create a new booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Vehicle to reserve.
    pub vehicle_id: VehicleId,
    /// Inclusive start.
    pub start_date: DateTime<Utc>,
    /// Exclusive end.
    pub end_date: DateTime<Utc>,
    /// Customer notes.
    pub notes: Option<String>,
}

/// Request to change an existing booking. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    /// Target lifecycle status.
    pub status: Option<BookingStatus>,
    /// New start.
    pub start_date: Option<DateTime<Utc>>,
    /// New end.
    pub end_date: Option<DateTime<Utc>>,
    /// New vehicle.
    pub vehicle_id: Option<VehicleId>,
    /// Replacement notes.
    pub notes: Option<String>,
    /// Deposit received flag.
    pub deposit_paid: Option<bool>,
}

impl UpdateBookingRequest {
    /// A bare status transition.
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// A booking together with the vehicle it reserves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    /// The booking.
    pub booking: Booking,
    /// The reserved vehicle, if the registry still knows it.
    pub vehicle: Option<Vehicle>,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Lists the caller's bookings, newest first.
    pub async fn list_bookings(
        &self,
        ctx: &RequestContext,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<BookingDetails>> {
        let bookings = self
            .store
            .list_bookings(ctx.customer_id, filter, &page)
            .await?;

        let mut vehicles: HashMap<VehicleId, Option<Vehicle>> = HashMap::new();
        for booking in &bookings.items {
            if !vehicles.contains_key(&booking.vehicle_id) {
                let vehicle = self.store.find_vehicle(booking.vehicle_id).await?;
                vehicles.insert(booking.vehicle_id, vehicle);
            }
        }

        Ok(bookings.map(|booking| {
            let vehicle = vehicles.get(&booking.vehicle_id).cloned().flatten();
            BookingDetails { booking, vehicle }
        }))
    }

    /// Fetches one of the caller's bookings.
    pub async fn get_booking(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> AppResult<BookingDetails> {
        let booking = self.owned_booking(ctx, booking_id).await?;
        let vehicle = self.store.find_vehicle(booking.vehicle_id).await?;
        Ok(BookingDetails { booking, vehicle })
    }

    /// Creates a pending booking.
    ///
    /// The vehicle's period is checked against its confirmed and active
    /// bookings and the booking is written within one unit of work that
    /// holds the vehicle's lock.
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        req: CreateBookingRequest,
    ) -> AppResult<BookingDetails> {
        let now = ctx.request_time;
        let period = validation::validate_period(req.start_date, req.end_date, now)?;

        let mut uow = self.store.begin(&[req.vehicle_id]).await?;

        let vehicle = uow.get_vehicle(req.vehicle_id).await?;
        validation::ensure_bookable(&vehicle)?;
        overlap::ensure_no_overlap(uow.as_mut(), vehicle.id, &period, None).await?;

        let quote = pricing::quote(vehicle.daily_rate, &period);
        let booking = Booking::pending(
            NewBooking {
                customer_id: ctx.customer_id,
                vehicle_id: vehicle.id,
                period,
                total_amount: quote.total_amount,
                deposit_amount: quote.deposit_amount,
                notes: req.notes,
            },
            now,
        );

        uow.insert_booking(&booking).await?;
        uow.commit().await?;

        info!(
            booking_id = %booking.id,
            customer_id = %ctx.customer_id,
            vehicle_id = %vehicle.id,
            total_amount = %booking.total_amount,
            billable_days = quote.billable_days,
            "Booking created"
        );

        Ok(BookingDetails {
            booking,
            vehicle: Some(vehicle),
        })
    }

    /// Applies a status transition and/or edits to one of the caller's
    /// bookings.
    ///
    /// Changing the dates or the vehicle re-runs every creation check
    /// (future start, ordered dates, vehicle in service, no overlap with
    /// other bookings) and re-prices the booking. Entering a status that
    /// reserves the vehicle re-runs the overlap check. The booking write
    /// and any vehicle status change commit together.
    pub async fn update_booking_status(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
        req: UpdateBookingRequest,
    ) -> AppResult<BookingDetails> {
        let now = ctx.request_time;
        let snapshot = self.owned_booking(ctx, booking_id).await?;
        let target_vehicle = req.vehicle_id.unwrap_or(snapshot.vehicle_id);

        let mut uow = self
            .store
            .begin(&[snapshot.vehicle_id, target_vehicle])
            .await?;

        let current = uow
            .find_booking(booking_id)
            .await?
            .filter(|b| b.customer_id == ctx.customer_id)
            .ok_or_else(|| booking_not_found(booking_id))?;
        if current.vehicle_id != snapshot.vehicle_id {
            return Err(AppError::conflict(
                "Booking was modified concurrently, please retry.",
            ));
        }

        let next_status = req.status.unwrap_or(current.status);
        let effect = match req.status {
            Some(status) => lifecycle::plan(current.status, status)?,
            None => VehicleEffect::Keep,
        };

        let start = req.start_date.unwrap_or(current.start_date);
        let end = req.end_date.unwrap_or(current.end_date);
        let rescheduled = start != current.start_date
            || end != current.end_date
            || target_vehicle != current.vehicle_id;

        if rescheduled && current.status.is_terminal() {
            return Err(AppError::invalid_field(
                "status",
                format!("A {} booking cannot be rescheduled.", current.status),
            ));
        }

        let mut updated = current.clone();
        let period = if rescheduled {
            let period = validation::validate_period(start, end, now)?;
            if target_vehicle != current.vehicle_id {
                let vehicle = uow.get_vehicle(target_vehicle).await?;
                validation::ensure_bookable(&vehicle)?;
            }
            let quote = pricing::quote(uow.get_daily_rate(target_vehicle).await?, &period);
            updated.vehicle_id = target_vehicle;
            updated.start_date = period.start();
            updated.end_date = period.end();
            updated.total_amount = quote.total_amount;
            updated.deposit_amount = quote.deposit_amount;
            period
        } else {
            current.period().ok_or_else(|| {
                AppError::internal(format!("Booking {booking_id} has an empty period"))
            })?
        };

        let takes_vehicle = next_status.holds_vehicle() && !current.status.holds_vehicle();
        if !next_status.is_terminal() && (rescheduled || takes_vehicle) {
            overlap::ensure_no_overlap(uow.as_mut(), updated.vehicle_id, &period, Some(booking_id))
                .await?;
        }

        updated.status = next_status;
        if let Some(notes) = req.notes {
            updated.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
        if let Some(paid) = req.deposit_paid {
            updated.deposit_paid = paid;
        }
        updated.updated_at = now;

        uow.update_booking(&updated).await?;
        if let Some(status) = effect.vehicle_status() {
            self.apply_vehicle_status(uow.as_mut(), updated.vehicle_id, status)
                .await?;
        }
        let vehicle = uow.get_vehicle(updated.vehicle_id).await?;
        uow.commit().await?;

        info!(
            booking_id = %booking_id,
            customer_id = %ctx.customer_id,
            from = %current.status,
            to = %updated.status,
            rescheduled,
            "Booking updated"
        );

        Ok(BookingDetails {
            booking: updated,
            vehicle: Some(vehicle),
        })
    }

    /// Deletes one of the caller's bookings and frees its vehicle.
    pub async fn delete_booking(&self, ctx: &RequestContext, booking_id: BookingId) -> AppResult<()> {
        let snapshot = self.owned_booking(ctx, booking_id).await?;

        let mut uow = self.store.begin(&[snapshot.vehicle_id]).await?;
        let current = uow
            .find_booking(booking_id)
            .await?
            .filter(|b| b.customer_id == ctx.customer_id)
            .ok_or_else(|| booking_not_found(booking_id))?;
        if current.vehicle_id != snapshot.vehicle_id {
            return Err(AppError::conflict(
                "Booking was modified concurrently, please retry.",
            ));
        }

        uow.delete_booking(booking_id).await?;
        self.apply_vehicle_status(uow.as_mut(), current.vehicle_id, VehicleStatus::Available)
            .await?;
        uow.commit().await?;

        info!(
            booking_id = %booking_id,
            customer_id = %ctx.customer_id,
            vehicle_id = %current.vehicle_id,
            "Booking deleted"
        );
        Ok(())
    }

    /// Loads a booking, hiding other customers' bookings as not found.
    async fn owned_booking(&self, ctx: &RequestContext, booking_id: BookingId) -> AppResult<Booking> {
        match self.store.find_booking(booking_id).await? {
            Some(booking) if booking.customer_id == ctx.customer_id => Ok(booking),
            Some(_) => {
                debug!(
                    booking_id = %booking_id,
                    customer_id = %ctx.customer_id,
                    "Booking belongs to another customer"
                );
                Err(booking_not_found(booking_id))
            }
            None => Err(booking_not_found(booking_id)),
        }
    }

    async fn apply_vehicle_status(
        &self,
        uow: &mut dyn BookingUnitOfWork,
        vehicle_id: VehicleId,
        status: VehicleStatus,
    ) -> AppResult<()> {
        uow.set_status(vehicle_id, status).await?;
        info!(vehicle_id = %vehicle_id, status = %status, "Vehicle status updated");
        Ok(())
    }
}

fn booking_not_found(id: BookingId) -> AppError {
    AppError::not_found(format!("Booking {id} not found"))
}
