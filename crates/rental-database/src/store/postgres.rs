//! PostgreSQL booking store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use rental_core::error::{AppError, ErrorKind};
use rental_core::result::AppResult;
use rental_core::types::id::{BookingId, CustomerId, VehicleId};
use rental_core::types::pagination::{PageRequest, PageResponse};
use rental_entity::booking::{Booking, BookingPeriod};
use rental_entity::vehicle::{Vehicle, VehicleStatus};

use super::{
    BookingFilter, BookingStore, BookingUnitOfWork, VehicleRegistry, lock_order, vehicle_not_found,
};

const BOOKING_COLUMNS: &str = "id, customer_id, vehicle_id, start_date, end_date, total_amount, \
     deposit_amount, deposit_paid, status, notes, created_at, updated_at";

const VEHICLE_COLUMNS: &str =
    "id, owner_id, make, model, year, plate_number, daily_rate, status, created_at, updated_at";

/// Shared WHERE clause for customer listings. `$1` customer, `$2` status,
/// `$3` vehicle, `$4` from-day, `$5` to-day.
const LIST_FILTER: &str = "customer_id = $1 \
     AND ($2::booking_status IS NULL OR status = $2) \
     AND ($3::uuid IS NULL OR vehicle_id = $3) \
     AND ($4::date IS NULL OR (start_date AT TIME ZONE 'UTC')::date >= $4) \
     AND ($5::date IS NULL OR (end_date AT TIME ZONE 'UTC')::date <= $5)";

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

/// Booking store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn begin(&self, vehicles: &[VehicleId]) -> AppResult<Box<dyn BookingUnitOfWork>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let ids: Vec<Uuid> = lock_order(vehicles)
            .into_iter()
            .map(VehicleId::into_uuid)
            .collect();

        // Row locks on the vehicles serialize every writer touching them.
        sqlx::query("SELECT id FROM vehicles WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to lock vehicles"))?;

        debug!(vehicles = ids.len(), "Opened booking transaction");
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find booking"))
    }

    async fn find_vehicle(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find vehicle"))
    }

    async fn list_bookings(
        &self,
        customer_id: CustomerId,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM bookings WHERE {LIST_FILTER}"))
                .bind(customer_id)
                .bind(filter.status)
                .bind(filter.vehicle_id)
                .bind(filter.from)
                .bind(filter.to)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count bookings"))?;

        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {LIST_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
        ))
        .bind(customer_id)
        .bind(filter.status)
        .bind(filter.vehicle_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list bookings"))?;

        Ok(PageResponse::new(bookings, page, total as u64))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(db_error("Health check failed"))
    }
}

/// One PostgreSQL transaction. Dropping it rolls back.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VehicleRegistry for PgUnitOfWork {
    async fn get_vehicle(&mut self, id: VehicleId) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load vehicle"))?
        .ok_or_else(|| vehicle_not_found(id))
    }

    async fn set_status(&mut self, id: VehicleId, status: VehicleStatus) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE vehicles SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&mut *self.tx)
                .await
                .map_err(db_error("Failed to update vehicle status"))?;

        if result.rows_affected() == 0 {
            return Err(vehicle_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingUnitOfWork for PgUnitOfWork {
    async fn find_booking(&mut self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to find booking"))
    }

    async fn find_conflicting(
        &mut self,
        vehicle_id: VehicleId,
        period: &BookingPeriod,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE vehicle_id = $1 \
             AND status IN ('confirmed', 'active') \
             AND start_date < $3 AND end_date > $2 \
             AND ($4::uuid IS NULL OR id <> $4) \
             ORDER BY start_date"
        ))
        .bind(vehicle_id)
        .bind(period.start())
        .bind(period.end())
        .bind(exclude)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to check for conflicting bookings"))
    }

    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(booking.vehicle_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_amount)
        .bind(booking.deposit_amount)
        .bind(booking.deposit_paid)
        .bind(booking.status)
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to insert booking"))?;
        Ok(())
    }

    async fn update_booking(&mut self, booking: &Booking) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE bookings SET vehicle_id = $2, start_date = $3, end_date = $4, \
             total_amount = $5, deposit_amount = $6, deposit_paid = $7, status = $8, \
             notes = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(booking.id)
        .bind(booking.vehicle_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_amount)
        .bind(booking.deposit_amount)
        .bind(booking.deposit_paid)
        .bind(booking.status)
        .bind(&booking.notes)
        .bind(booking.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update booking"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Booking {} not found", booking.id)));
        }
        Ok(())
    }

    async fn delete_booking(&mut self, id: BookingId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete booking"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let PgUnitOfWork { tx } = *self;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit booking transaction"))
    }
}
