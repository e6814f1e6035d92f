//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use rental_core::error::AppError;
use rental_core::result::AppResult;
use rental_core::types::id::VehicleId;
use rental_database::BookingFilter;
use rental_entity::booking::BookingStatus;
use rental_service::booking::{CreateBookingRequest, UpdateBookingRequest};

/// Longest accepted notes text, in characters.
pub const MAX_NOTES_LEN: usize = 1000;
const MAX_NOTES_LEN_U64: u64 = MAX_NOTES_LEN as u64;

/// Create booking request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingBody {
    /// Vehicle to reserve.
    pub vehicle_id: Uuid,
    /// Inclusive start (RFC 3339).
    pub start_date: DateTime<Utc>,
    /// Exclusive end (RFC 3339).
    pub end_date: DateTime<Utc>,
    /// Customer notes.
    #[validate(length(max = MAX_NOTES_LEN_U64, message = "Notes must be at most 1000 characters."))]
    pub notes: Option<String>,
}

impl CreateBookingBody {
    /// Validates the body and converts it into a service request.
    pub fn into_request(self) -> AppResult<CreateBookingRequest> {
        self.validate().map_err(validation_error)?;
        Ok(CreateBookingRequest {
            vehicle_id: VehicleId::from_uuid(self.vehicle_id),
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Update booking request body. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBookingBody {
    /// Target status (`pending`, `confirmed`, `active`, `completed`, `cancelled`).
    pub status: Option<String>,
    /// New start.
    pub start_date: Option<DateTime<Utc>>,
    /// New end.
    pub end_date: Option<DateTime<Utc>>,
    /// New vehicle.
    pub vehicle_id: Option<Uuid>,
    /// Replacement notes; an empty string clears them.
    #[validate(length(max = MAX_NOTES_LEN_U64, message = "Notes must be at most 1000 characters."))]
    pub notes: Option<String>,
    /// Deposit received flag.
    pub deposit_paid: Option<bool>,
}

impl UpdateBookingBody {
    /// Validates the body and converts it into a service request.
    pub fn into_request(self) -> AppResult<UpdateBookingRequest> {
        self.validate().map_err(validation_error)?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<BookingStatus>)
            .transpose()?;

        Ok(UpdateBookingRequest {
            status,
            start_date: self.start_date,
            end_date: self.end_date,
            vehicle_id: self.vehicle_id.map(VehicleId::from_uuid),
            notes: self.notes,
            deposit_paid: self.deposit_paid,
        })
    }
}

/// Query string of the booking list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQuery {
    /// Only bookings in this status.
    pub status: Option<String>,
    /// Only bookings for this vehicle.
    pub vehicle: Option<Uuid>,
    /// Only bookings starting on or after this day.
    pub from: Option<NaiveDate>,
    /// Only bookings ending on or before this day.
    pub to: Option<NaiveDate>,
}

impl BookingQuery {
    /// Parses the query into a store filter.
    pub fn into_filter(self) -> AppResult<BookingFilter> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<BookingStatus>)
            .transpose()?;

        Ok(BookingFilter {
            status,
            vehicle_id: self.vehicle.map(VehicleId::from_uuid),
            from: self.from,
            to: self.to,
        })
    }
}

/// Converts `validator` output into a field-level validation error.
///
/// When several fields fail, the alphabetically first one is reported.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    match fields.first() {
        Some((field, errs)) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {field}."));
            AppError::invalid_field(field.to_string(), message)
        }
        None => AppError::validation("Invalid request body."),
    }
}
