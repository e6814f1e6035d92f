//! Booking service behaviour over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use rental_core::error::ErrorKind;
use rental_core::types::id::{BookingId, CustomerId, VehicleId};
use rental_core::types::pagination::PageRequest;
use rental_database::store::{BookingFilter, BookingStore};
use rental_database::MemoryBookingStore;
use rental_entity::booking::BookingStatus;
use rental_entity::vehicle::{Vehicle, VehicleStatus};
use rental_service::booking::{CreateBookingRequest, UpdateBookingRequest};
use rental_service::{BookingService, RequestContext};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 6, 1, 9, 0, 0).unwrap()
}

/// Midnight `n` days after the fixed clock's date.
fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

struct Fixture {
    store: Arc<MemoryBookingStore>,
    service: BookingService,
    vehicle_id: VehicleId,
}

impl Fixture {
    async fn new() -> Self {
        let store = Arc::new(MemoryBookingStore::new());
        let vehicle = Vehicle::new(Uuid::new_v4(), "Toyota", "Corolla", 2022, "TST-001", dec!(50.00));
        let vehicle_id = vehicle.id;
        store.put_vehicle(vehicle).await;
        let service = BookingService::new(store.clone());
        Self {
            store,
            service,
            vehicle_id,
        }
    }

    async fn add_vehicle(&self, plate: &str, rate: rust_decimal::Decimal) -> VehicleId {
        let vehicle = Vehicle::new(Uuid::new_v4(), "Ford", "Focus", 2020, plate, rate);
        let id = vehicle.id;
        self.store.put_vehicle(vehicle).await;
        id
    }

    async fn vehicle_status(&self, id: VehicleId) -> VehicleStatus {
        self.store.find_vehicle(id).await.unwrap().unwrap().status
    }

    async fn book(
        &self,
        ctx: &RequestContext,
        from: i64,
        to: i64,
    ) -> Result<BookingId, rental_core::AppError> {
        self.service
            .create_booking(
                ctx,
                CreateBookingRequest {
                    vehicle_id: self.vehicle_id,
                    start_date: day(from),
                    end_date: day(to),
                    notes: None,
                },
            )
            .await
            .map(|d| d.booking.id)
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<BookingStatus, rental_core::AppError> {
        self.service
            .update_booking_status(ctx, id, UpdateBookingRequest::status(status))
            .await
            .map(|d| d.booking.status)
    }
}

fn customer() -> RequestContext {
    RequestContext::at(CustomerId::new(), now())
}

#[tokio::test]
async fn test_booking_lifecycle_walkthrough() {
    let fx = Fixture::new().await;
    let alice = customer();
    let bob = customer();

    let created = fx
        .service
        .create_booking(
            &alice,
            CreateBookingRequest {
                vehicle_id: fx.vehicle_id,
                start_date: day(10),
                end_date: day(12),
                notes: Some("Child seat please".into()),
            },
        )
        .await
        .unwrap();
    let a = created.booking.id;
    assert_eq!(created.booking.status, BookingStatus::Pending);
    assert_eq!(created.booking.total_amount, dec!(100.00));
    assert_eq!(created.booking.deposit_amount, dec!(20.00));
    assert_eq!(created.booking.total_amount.to_string(), "100.00");
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Available);

    fx.transition(&alice, a, BookingStatus::Confirmed).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Rented);

    let err = fx.book(&bob, 11, 13).await.unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
    assert_eq!(err.field.as_deref(), Some("vehicle"));
    assert_eq!(err.message, "Vehicle is not available for the selected dates.");

    fx.book(&bob, 12, 14).await.unwrap();

    fx.transition(&alice, a, BookingStatus::Cancelled).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirmations_admit_exactly_one() {
    let fx = Arc::new(Fixture::new().await);

    let mut pending = Vec::new();
    for _ in 0..8 {
        let ctx = customer();
        let id = fx.book(&ctx, 20, 23).await.unwrap();
        pending.push((ctx, id));
    }

    let handles: Vec<_> = pending
        .into_iter()
        .map(|(ctx, id)| {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move { fx.transition(&ctx, id, BookingStatus::Confirmed).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.is(ErrorKind::Conflict))
    );

    let confirmed = fx
        .store
        .bookings_for_vehicle(fx.vehicle_id)
        .await
        .into_iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();
    assert_eq!(confirmed, 1);
}

#[tokio::test]
async fn test_back_to_back_bookings_do_not_conflict() {
    let fx = Fixture::new().await;
    let ctx = customer();

    let first = fx.book(&ctx, 3, 5).await.unwrap();
    fx.transition(&ctx, first, BookingStatus::Confirmed).await.unwrap();

    let second = fx.book(&ctx, 5, 7).await.unwrap();
    assert_eq!(
        fx.transition(&ctx, second, BookingStatus::Confirmed).await.unwrap(),
        BookingStatus::Confirmed
    );
    let earlier = fx.book(&ctx, 1, 3).await.unwrap();
    fx.transition(&ctx, earlier, BookingStatus::Active).await.unwrap_err();
    fx.transition(&ctx, earlier, BookingStatus::Confirmed).await.unwrap();
}

#[tokio::test]
async fn test_pending_bookings_do_not_block() {
    let fx = Fixture::new().await;
    fx.book(&customer(), 4, 8).await.unwrap();
    fx.book(&customer(), 5, 6).await.unwrap();
    assert_eq!(fx.store.bookings_for_vehicle(fx.vehicle_id).await.len(), 2);
}

#[tokio::test]
async fn test_period_validation() {
    let fx = Fixture::new().await;
    let ctx = customer();

    let past = fx
        .service
        .create_booking(
            &ctx,
            CreateBookingRequest {
                vehicle_id: fx.vehicle_id,
                start_date: now() - Duration::hours(1),
                end_date: day(3),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(past.is(ErrorKind::Validation));
    assert_eq!(past.field.as_deref(), Some("start_date"));
    assert_eq!(past.message, "Start date must be in the future.");

    let at_now = fx
        .service
        .create_booking(
            &ctx,
            CreateBookingRequest {
                vehicle_id: fx.vehicle_id,
                start_date: now(),
                end_date: day(3),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(at_now.field.as_deref(), Some("start_date"));

    let inverted = fx.book(&ctx, 5, 5).await.unwrap_err();
    assert!(inverted.is(ErrorKind::Validation));
    assert_eq!(inverted.field.as_deref(), Some("end_date"));
    assert_eq!(inverted.message, "End date must be after start date.");

    assert!(fx.store.bookings_for_vehicle(fx.vehicle_id).await.is_empty());
}

#[tokio::test]
async fn test_sub_day_rental_bills_one_day() {
    let fx = Fixture::new().await;
    let details = fx
        .service
        .create_booking(
            &customer(),
            CreateBookingRequest {
                vehicle_id: fx.vehicle_id,
                start_date: day(2) + Duration::hours(9),
                end_date: day(2) + Duration::hours(15),
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(details.booking.duration_days(), 0);
    assert_eq!(details.booking.total_amount, dec!(50.00));
    assert_eq!(details.booking.deposit_amount, dec!(10.00));
}

#[tokio::test]
async fn test_vehicle_status_side_effects() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 4).await.unwrap();

    fx.transition(&ctx, id, BookingStatus::Confirmed).await.unwrap();
    fx.transition(&ctx, id, BookingStatus::Active).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Rented);

    fx.transition(&ctx, id, BookingStatus::Completed).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Rented);

    fx.transition(&ctx, id, BookingStatus::Cancelled).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Available);
}

#[tokio::test]
async fn test_illegal_transitions_leave_state_untouched() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 4).await.unwrap();

    let err = fx.transition(&ctx, id, BookingStatus::Active).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));
    assert_eq!(err.field.as_deref(), Some("status"));

    fx.transition(&ctx, id, BookingStatus::Cancelled).await.unwrap();
    let err = fx.transition(&ctx, id, BookingStatus::Confirmed).await.unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let stored = fx.store.find_booking(id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Available);
}

#[tokio::test]
async fn test_other_customers_bookings_are_not_found() {
    let fx = Fixture::new().await;
    let owner = customer();
    let intruder = customer();
    let id = fx.book(&owner, 1, 2).await.unwrap();

    let err = fx.service.get_booking(&intruder, id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    let err = fx
        .transition(&intruder, id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    let err = fx.service.delete_booking(&intruder, id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let mine = fx.service.get_booking(&owner, id).await.unwrap();
    assert_eq!(mine.booking.status, BookingStatus::Pending);
    assert_eq!(mine.vehicle.unwrap().id, fx.vehicle_id);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let fx = Fixture::new().await;
    let ctx = customer();

    let err = fx
        .service
        .create_booking(
            &ctx,
            CreateBookingRequest {
                vehicle_id: VehicleId::new(),
                start_date: day(1),
                end_date: day(2),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = fx.service.get_booking(&ctx, BookingId::new()).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_vehicle_out_of_service_is_rejected() {
    let fx = Fixture::new().await;
    fx.store
        .set_vehicle_status(fx.vehicle_id, VehicleStatus::Maintenance)
        .await
        .unwrap();

    let err = fx.book(&customer(), 1, 2).await.unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
    assert_eq!(err.field.as_deref(), Some("vehicle"));

    fx.store
        .set_vehicle_status(fx.vehicle_id, VehicleStatus::Rented)
        .await
        .unwrap();
    fx.book(&customer(), 1, 2).await.unwrap();
}

#[tokio::test]
async fn test_reschedule_reprices_and_excludes_itself() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 3).await.unwrap();
    fx.transition(&ctx, id, BookingStatus::Confirmed).await.unwrap();

    let moved = fx
        .service
        .update_booking_status(
            &ctx,
            id,
            UpdateBookingRequest {
                end_date: Some(day(5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.booking.status, BookingStatus::Confirmed);
    assert_eq!(moved.booking.total_amount, dec!(200.00));
    assert_eq!(moved.booking.deposit_amount, dec!(40.00));
    assert_eq!(moved.booking.updated_at, now());

    let other = customer();
    let blocker = fx.book(&other, 10, 12).await.unwrap();
    fx.transition(&other, blocker, BookingStatus::Confirmed).await.unwrap();

    let err = fx
        .service
        .update_booking_status(
            &ctx,
            id,
            UpdateBookingRequest {
                start_date: Some(day(9)),
                end_date: Some(day(11)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Conflict));

    let stored = fx.store.find_booking(id).await.unwrap().unwrap();
    assert_eq!(stored.end_date, day(5));
}

#[tokio::test]
async fn test_move_to_another_vehicle() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let other_vehicle = fx.add_vehicle("TST-002", dec!(35.50)).await;
    let id = fx.book(&ctx, 1, 3).await.unwrap();

    let moved = fx
        .service
        .update_booking_status(
            &ctx,
            id,
            UpdateBookingRequest {
                vehicle_id: Some(other_vehicle),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.booking.vehicle_id, other_vehicle);
    assert_eq!(moved.booking.total_amount, dec!(71.00));
    assert_eq!(moved.booking.deposit_amount, dec!(14.20));
    assert_eq!(moved.vehicle.unwrap().plate_number, "TST-002");
}

#[tokio::test]
async fn test_notes_and_deposit_updates() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 3).await.unwrap();

    let updated = fx
        .service
        .update_booking_status(
            &ctx,
            id,
            UpdateBookingRequest {
                notes: Some("Late pickup".into()),
                deposit_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.booking.notes.as_deref(), Some("Late pickup"));
    assert!(updated.booking.deposit_paid);
    assert_eq!(updated.booking.status, BookingStatus::Pending);
    assert_eq!(updated.booking.total_amount, dec!(100.00));
}

#[tokio::test]
async fn test_terminal_bookings_cannot_be_rescheduled() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 3).await.unwrap();
    fx.transition(&ctx, id, BookingStatus::Cancelled).await.unwrap();

    let err = fx
        .service
        .update_booking_status(
            &ctx,
            id,
            UpdateBookingRequest {
                end_date: Some(day(4)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));
}

#[tokio::test]
async fn test_delete_releases_vehicle() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let id = fx.book(&ctx, 1, 3).await.unwrap();
    fx.transition(&ctx, id, BookingStatus::Confirmed).await.unwrap();
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Rented);

    fx.service.delete_booking(&ctx, id).await.unwrap();
    assert!(fx.store.find_booking(id).await.unwrap().is_none());
    assert_eq!(fx.vehicle_status(fx.vehicle_id).await, VehicleStatus::Available);

    let err = fx.service.delete_booking(&ctx, id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_list_bookings_filters_and_pages() {
    let fx = Fixture::new().await;
    let ctx = customer();
    let first = fx.book(&ctx, 1, 2).await.unwrap();
    fx.book(&ctx, 3, 4).await.unwrap();
    fx.book(&ctx, 5, 6).await.unwrap();
    fx.book(&customer(), 7, 8).await.unwrap();
    fx.transition(&ctx, first, BookingStatus::Confirmed).await.unwrap();

    let all = fx
        .service
        .list_bookings(&ctx, &BookingFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);
    assert!(all.items.iter().all(|d| d.vehicle.is_some()));

    let confirmed = fx
        .service
        .list_bookings(
            &ctx,
            &BookingFilter {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.items.len(), 1);
    assert_eq!(confirmed.items[0].booking.id, first);

    let paged = fx
        .service
        .list_bookings(&ctx, &BookingFilter::default(), PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(paged.items.len(), 1);
    assert_eq!(paged.total_pages, 2);
    assert!(!paged.has_next);
    assert!(paged.has_previous);
}

#[tokio::test]
async fn test_registry_lookups_inside_unit_of_work() {
    let fx = Fixture::new().await;
    let mut uow = fx.store.begin(&[fx.vehicle_id]).await.unwrap();
    assert_eq!(uow.get_daily_rate(fx.vehicle_id).await.unwrap(), dec!(50.00));
    assert_eq!(
        uow.get_status(fx.vehicle_id).await.unwrap(),
        VehicleStatus::Available
    );
}
