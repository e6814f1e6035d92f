//! Vehicle entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use rental_core::types::id::VehicleId;

use super::status::VehicleStatus;

/// A rentable vehicle. Owned and maintained by the vehicle registry; the
/// booking core only reads it and flips its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    /// Unique vehicle identifier.
    pub id: VehicleId,
    /// User who lists the vehicle.
    pub owner_id: Uuid,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Registration plate, unique across the fleet.
    pub plate_number: String,
    /// Price per day.
    pub daily_rate: Decimal,
    /// Current availability state.
    pub status: VehicleStatus,
    /// When the vehicle was registered.
    pub created_at: DateTime<Utc>,
    /// When the vehicle was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Create an available vehicle.
    pub fn new(
        owner_id: Uuid,
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        plate_number: impl Into<String>,
        daily_rate: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VehicleId::new(),
            owner_id,
            make: make.into(),
            model: model.into(),
            year,
            plate_number: plate_number.into(),
            daily_rate,
            status: VehicleStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name, `"{year} {make} {model}"`.
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}
