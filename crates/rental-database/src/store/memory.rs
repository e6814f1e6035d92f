//! In-memory booking store using a Tokio mutex for single-node deployments
//! and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_core::types::id::{BookingId, CustomerId, VehicleId};
use rental_core::types::pagination::{PageRequest, PageResponse};
use rental_entity::booking::{Booking, BookingPeriod};
use rental_entity::vehicle::{Vehicle, VehicleStatus};

use super::{BookingFilter, BookingStore, BookingUnitOfWork, VehicleRegistry, vehicle_not_found};

/// Tables held by the memory store.
#[derive(Debug, Clone, Default)]
struct InnerState {
    vehicles: HashMap<VehicleId, Vehicle>,
    bookings: HashMap<BookingId, Booking>,
}

/// In-memory booking store.
///
/// A single mutex guards all state, so one unit of work runs at a time
/// regardless of which vehicles it names. Each unit edits a private copy
/// that replaces the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryBookingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a vehicle.
    pub async fn put_vehicle(&self, vehicle: Vehicle) {
        let mut state = self.state.lock().await;
        debug!(vehicle_id = %vehicle.id, status = %vehicle.status, "Vehicle registered");
        state.vehicles.insert(vehicle.id, vehicle);
    }

    /// Overwrite a vehicle's status outside any unit of work.
    pub async fn set_vehicle_status(&self, id: VehicleId, status: VehicleStatus) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let vehicle = state.vehicles.get_mut(&id).ok_or_else(|| vehicle_not_found(id))?;
        vehicle.status = status;
        vehicle.updated_at = Utc::now();
        Ok(())
    }

    /// Every stored booking for a vehicle, in no particular order.
    pub async fn bookings_for_vehicle(&self, vehicle_id: VehicleId) -> Vec<Booking> {
        let state = self.state.lock().await;
        state
            .bookings
            .values()
            .filter(|b| b.vehicle_id == vehicle_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn begin(&self, _vehicles: &[VehicleId]) -> AppResult<Box<dyn BookingUnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }

    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&id).cloned())
    }

    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        Ok(self.state.lock().await.vehicles.get(&id).cloned())
    }

    async fn list_bookings(
        &self,
        customer_id: CustomerId,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let state = self.state.lock().await;
        let mut matching: Vec<&Booking> = state
            .bookings
            .values()
            .filter(|b| b.customer_id == customer_id && filter.matches(b))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(PageResponse::new(items, page, total))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Exclusive access to the store plus the copy being edited.
struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<InnerState>,
    staged: InnerState,
}

#[async_trait]
impl VehicleRegistry for MemoryUnitOfWork {
    async fn get_vehicle(&mut self, id: VehicleId) -> AppResult<Vehicle> {
        self.staged
            .vehicles
            .get(&id)
            .cloned()
            .ok_or_else(|| vehicle_not_found(id))
    }

    async fn set_status(&mut self, id: VehicleId, status: VehicleStatus) -> AppResult<()> {
        let vehicle = self
            .staged
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| vehicle_not_found(id))?;
        vehicle.status = status;
        vehicle.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl BookingUnitOfWork for MemoryUnitOfWork {
    async fn find_booking(&mut self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.staged.bookings.get(&id).cloned())
    }

    async fn find_conflicting(
        &mut self,
        vehicle_id: VehicleId,
        period: &BookingPeriod,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>> {
        let mut conflicts: Vec<Booking> = self
            .staged
            .bookings
            .values()
            .filter(|b| Some(b.id) != exclude && b.blocks(vehicle_id, period))
            .cloned()
            .collect();
        conflicts.sort_by_key(|b| b.start_date);
        Ok(conflicts)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<()> {
        if self.staged.bookings.contains_key(&booking.id) {
            return Err(AppError::conflict(format!(
                "Booking {} already exists",
                booking.id
            )));
        }
        self.staged.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()> {
        match self.staged.bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Booking {} not found",
                booking.id
            ))),
        }
    }

    async fn delete_booking(&mut self, id: BookingId) -> AppResult<bool> {
        Ok(self.staged.bookings.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rental_entity::booking::{BookingStatus, NewBooking};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    async fn store_with_vehicle() -> (MemoryBookingStore, VehicleId) {
        let store = MemoryBookingStore::new();
        let vehicle = Vehicle::new(Uuid::new_v4(), "Honda", "Civic", 2021, "MEM-001", dec!(40.00));
        let id = vehicle.id;
        store.put_vehicle(vehicle).await;
        (store, id)
    }

    fn booking(vehicle_id: VehicleId, offset_days: i64, days: i64, status: BookingStatus) -> Booking {
        let start = Utc::now() + Duration::days(offset_days);
        let mut b = Booking::pending(
            NewBooking {
                customer_id: CustomerId::new(),
                vehicle_id,
                period: BookingPeriod::new(start, start + Duration::days(days)).unwrap(),
                total_amount: dec!(80.00),
                deposit_amount: dec!(16.00),
                notes: None,
            },
            Utc::now(),
        );
        b.status = status;
        b
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let (store, vehicle_id) = store_with_vehicle().await;
        let b = booking(vehicle_id, 1, 2, BookingStatus::Pending);

        let mut uow = store.begin(&[vehicle_id]).await.unwrap();
        uow.insert_booking(&b).await.unwrap();
        uow.set_status(vehicle_id, VehicleStatus::Rented).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.find_booking(b.id).await.unwrap(), Some(b));
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Rented);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let (store, vehicle_id) = store_with_vehicle().await;
        let b = booking(vehicle_id, 1, 2, BookingStatus::Pending);

        {
            let mut uow = store.begin(&[vehicle_id]).await.unwrap();
            uow.insert_booking(&b).await.unwrap();
            uow.set_status(vehicle_id, VehicleStatus::Rented).await.unwrap();
        }

        assert!(store.find_booking(b.id).await.unwrap().is_none());
        let vehicle = store.find_vehicle(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn test_find_conflicting_ignores_pending_and_excluded() {
        let (store, vehicle_id) = store_with_vehicle().await;
        let confirmed = booking(vehicle_id, 1, 3, BookingStatus::Confirmed);
        let pending = booking(vehicle_id, 1, 3, BookingStatus::Pending);

        let mut uow = store.begin(&[vehicle_id]).await.unwrap();
        uow.insert_booking(&confirmed).await.unwrap();
        uow.insert_booking(&pending).await.unwrap();

        let window = pending.period().unwrap();
        let found = uow.find_conflicting(vehicle_id, &window, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, confirmed.id);

        let excluded = uow
            .find_conflicting(vehicle_id, &window, Some(confirmed.id))
            .await
            .unwrap();
        assert!(excluded.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_not_found() {
        let store = MemoryBookingStore::new();
        let mut uow = store.begin(&[]).await.unwrap();
        let err = uow.get_vehicle(VehicleId::new()).await.unwrap_err();
        assert!(err.is(rental_core::error::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let (store, vehicle_id) = store_with_vehicle().await;
        let customer = CustomerId::new();
        let mut older = booking(vehicle_id, 1, 1, BookingStatus::Pending);
        older.customer_id = customer;
        older.created_at = Utc::now() - Duration::hours(2);
        let mut newer = booking(vehicle_id, 5, 1, BookingStatus::Pending);
        newer.customer_id = customer;
        let stranger = booking(vehicle_id, 9, 1, BookingStatus::Pending);

        let mut uow = store.begin(&[vehicle_id]).await.unwrap();
        for b in [&older, &newer, &stranger] {
            uow.insert_booking(b).await.unwrap();
        }
        uow.commit().await.unwrap();

        let page = store
            .list_bookings(customer, &BookingFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.total_items, 2);
    }
}
