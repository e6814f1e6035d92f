//! Response DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rental_core::types::id::{BookingId, CustomerId, VehicleId};
use rental_core::types::pagination::PageResponse;
use rental_entity::booking::BookingStatus;
use rental_entity::vehicle::{Vehicle, VehicleStatus};
use rental_service::booking::BookingDetails;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Total item count.
    pub total: u64,
    /// Current page.
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total pages.
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Converts a store page, mapping each item.
    pub fn from_page<S>(page: PageResponse<S>, f: impl FnMut(S) -> T) -> Self {
        Self {
            total: page.total_items,
            page: page.page,
            per_page: page.page_size,
            total_pages: page.total_pages,
            items: page.items.into_iter().map(f).collect(),
        }
    }
}

/// Vehicle summary embedded in booking responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    pub daily_rate: Decimal,
    pub status: VehicleStatus,
    /// `"{year} {make} {model}"`.
    pub full_name: String,
}

impl From<Vehicle> for VehicleSummary {
    fn from(v: Vehicle) -> Self {
        Self {
            full_name: v.full_name(),
            id: v.id,
            make: v.make,
            model: v.model,
            year: v.year,
            plate_number: v.plate_number,
            daily_rate: v.daily_rate,
            status: v.status,
        }
    }
}

/// Full booking representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: BookingId,
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whole days between start and end.
    pub duration_days: i64,
    /// Active and currently within its period.
    pub is_active: bool,
    /// Active and past its end date.
    pub is_overdue: bool,
    /// The reserved vehicle, when still registered.
    pub vehicle: Option<VehicleSummary>,
}

impl BookingResponse {
    /// Builds the response, evaluating derived flags at `now`.
    pub fn from_details(details: BookingDetails, now: DateTime<Utc>) -> Self {
        let BookingDetails { booking, vehicle } = details;
        Self {
            duration_days: booking.duration_days(),
            is_active: booking.is_active_at(now),
            is_overdue: booking.is_overdue_at(now),
            vehicle: vehicle.map(VehicleSummary::from),
            id: booking.id,
            customer_id: booking.customer_id,
            vehicle_id: booking.vehicle_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_amount: booking.total_amount,
            deposit_amount: booking.deposit_amount,
            deposit_paid: booking.deposit_paid,
            status: booking.status,
            notes: booking.notes,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Compact booking row for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingListItem {
    pub id: BookingId,
    pub vehicle_id: VehicleId,
    /// Vehicle full name, if the vehicle is still registered.
    pub vehicle_name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub duration_days: i64,
    pub is_active: bool,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
}

impl BookingListItem {
    /// Builds a list row, evaluating derived flags at `now`.
    pub fn from_details(details: BookingDetails, now: DateTime<Utc>) -> Self {
        let BookingDetails { booking, vehicle } = details;
        Self {
            id: booking.id,
            vehicle_id: booking.vehicle_id,
            vehicle_name: vehicle.as_ref().map(Vehicle::full_name),
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_amount: booking.total_amount,
            deposit_amount: booking.deposit_amount,
            deposit_paid: booking.deposit_paid,
            status: booking.status,
            duration_days: booking.duration_days(),
            is_active: booking.is_active_at(now),
            is_overdue: booking.is_overdue_at(now),
            created_at: booking.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// `connected` or `unavailable`.
    pub database: String,
}
