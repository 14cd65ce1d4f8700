//! Expert catalogue endpoints (read only).

use super::ApiResponse;
use crate::{AppState, WebResult};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use expert_booking_core::{
    BookingError, BookingLedger, Category, Expert, ExpertCatalog, ExpertId, ExpertQuery,
    ExpertSummary, ListingParams, SlotStore,
};
use tracing::instrument;

/// `GET /api/experts?page=&limit=&search=&category=`
///
/// Malformed paging parameters fall back to their defaults; an unknown category
/// yields an empty page.
///
/// # Errors
///
/// 500 if the catalogue cannot be read.
#[instrument(skip(state))]
pub async fn list_experts<E, L>(
    State(state): State<AppState<E, L>>,
    Query(params): Query<ListingParams>,
) -> WebResult<Json<ApiResponse<Vec<ExpertSummary>>>>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let query = ExpertQuery::from_params(&params, state.listing);
    let page = state
        .catalog
        .list_experts(&query)
        .await
        .map_err(BookingError::from)?;

    Ok(Json(
        ApiResponse::ok(page.items).with_pagination(page.pagination),
    ))
}

/// `GET /api/experts/:id`
///
/// # Errors
///
/// 400 for a malformed id, 404 for an unknown expert, 500 on store failure.
#[instrument(skip(state))]
pub async fn get_expert<E, L>(
    State(state): State<AppState<E, L>>,
    Path(id): Path<String>,
) -> WebResult<Json<ApiResponse<Expert>>>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let expert_id: ExpertId = id
        .trim()
        .parse()
        .map_err(|_| BookingError::invalid_field("expertId", "Invalid expert ID format"))?;

    let expert = state
        .catalog
        .get_expert(expert_id)
        .await
        .map_err(BookingError::from)?
        .ok_or(BookingError::ExpertNotFound)?;

    Ok(Json(ApiResponse::ok(expert)))
}

/// `GET /api/experts/categories/list`
///
/// # Errors
///
/// 500 if the catalogue cannot be read.
#[instrument(skip(state))]
pub async fn list_categories<E, L>(
    State(state): State<AppState<E, L>>,
) -> WebResult<Json<ApiResponse<Vec<Category>>>>
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let categories = state
        .catalog
        .categories()
        .await
        .map_err(BookingError::from)?;

    Ok(Json(ApiResponse::ok(categories)))
}
