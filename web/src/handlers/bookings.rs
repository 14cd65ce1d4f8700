//! Booking endpoints: create, update status, look up by contact email.

use super::ApiResponse;
use crate::{AppError, AppState, CorrelationId, JsonBody, WebResult};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use expert_booking_core::{Booking, BookingLedger, ExpertCatalog, ReservationRequest, SlotStore};
use serde::Deserialize;
use tracing::{info, instrument};

/// Body of `PATCH /api/bookings/:id/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    /// One of `pending`, `confirmed`, `completed`
    pub status: String,
}

/// Query of `GET /api/bookings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactQuery {
    /// Contact email the bookings were made with
    pub email: Option<String>,
}

/// `POST /api/bookings`
///
/// # Errors
///
/// 400 with per-field errors, 404 for an unknown expert, 409 when the slot is
/// taken, 500 on store failure.
#[instrument(skip(state, request), fields(correlation_id = %correlation_id))]
pub async fn create_booking<E, L>(
    State(state): State<AppState<E, L>>,
    correlation_id: CorrelationId,
    JsonBody(request): JsonBody<ReservationRequest>,
) -> WebResult<(StatusCode, Json<ApiResponse<Booking>>)>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let booking = state.reservations.create_reservation(request).await?;
    info!(booking_id = %booking.id, expert_id = %booking.expert_id, "Booking created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(booking).with_message("Booking created successfully!")),
    ))
}

/// `PATCH /api/bookings/:id/status`
///
/// # Errors
///
/// 400 for an invalid status or malformed id, 404 for an unknown booking, 500
/// on store failure.
#[instrument(skip(state, update))]
pub async fn update_booking_status<E, L>(
    State(state): State<AppState<E, L>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> WebResult<Json<ApiResponse<Booking>>>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let booking = state
        .reservations
        .update_status(&id, &update.status)
        .await?;
    let message = format!("Booking status updated to {}", booking.status);

    Ok(Json(ApiResponse::ok(booking).with_message(message)))
}

/// `GET /api/bookings?email=`
///
/// # Errors
///
/// 400 when `email` is missing or blank, 500 on store failure.
#[instrument(skip(state, query))]
pub async fn list_bookings<E, L>(
    State(state): State<AppState<E, L>>,
    Query(query): Query<ContactQuery>,
) -> WebResult<Json<ApiResponse<Vec<Booking>>>>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::bad_request("Email query parameter is required"))?;

    let bookings = state.reservations.list_by_contact(email).await?;
    let total = bookings.len();

    Ok(Json(ApiResponse::ok(bookings).with_total(total)))
}
