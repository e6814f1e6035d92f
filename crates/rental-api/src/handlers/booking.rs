//! Booking CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use rental_core::types::id::BookingId;

use crate::dto::request::{BookingQuery, CreateBookingBody, UpdateBookingBody};
use crate::dto::response::{ApiResponse, BookingListItem, BookingResponse, PaginatedResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// GET /api/bookings?status=&vehicle=&from=&to=&page=&per_page=
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<BookingQuery>,
    ValidatedQuery(pagination): ValidatedQuery<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<BookingListItem>>>, ApiError> {
    let filter = query.into_filter()?;
    let page = state
        .booking_service
        .list_bookings(&auth, &filter, pagination.into_page_request())
        .await?;

    let now = auth.request_time;
    Ok(Json(ApiResponse::ok(PaginatedResponse::from_page(
        page,
        |details| BookingListItem::from_details(details, now),
    ))))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let details = state
        .booking_service
        .get_booking(&auth, BookingId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(BookingResponse::from_details(
        details,
        auth.request_time,
    ))))
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateBookingBody>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), ApiError> {
    let details = state
        .booking_service
        .create_booking(&auth, body.into_request()?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BookingResponse::from_details(
            details,
            auth.request_time,
        ))),
    ))
}

/// PATCH /api/bookings/{id}
pub async fn update_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateBookingBody>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let details = state
        .booking_service
        .update_booking_status(&auth, BookingId::from_uuid(id), body.into_request()?)
        .await?;
    Ok(Json(ApiResponse::ok(BookingResponse::from_details(
        details,
        auth.request_time,
    ))))
}

/// DELETE /api/bookings/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .booking_service
        .delete_booking(&auth, BookingId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
