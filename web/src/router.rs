//! Router configuration for the booking API.

use crate::handlers::{bookings, experts, health, realtime};
use crate::middleware::{correlation_id_layer, cors_layer};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};
use expert_booking_core::{BookingLedger, ExpertCatalog, SlotStore};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Browser origins allowed besides `http://localhost*`
    pub allowed_origins: Vec<String>,
    /// Requests still running after this long are answered with 408
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Build the complete Axum router.
///
/// ```text
/// GET   /api/health
/// GET   /api/experts
/// GET   /api/experts/categories/list
/// GET   /api/experts/:id
/// POST  /api/bookings
/// GET   /api/bookings?email=
/// PATCH /api/bookings/:id/status
/// GET   /api/ws                       (WebSocket upgrade)
/// ```
pub fn build_router<E, L>(state: AppState<E, L>, config: &RouterConfig) -> Router
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        // Expert catalogue
        .route("/experts", get(experts::list_experts::<E, L>))
        .route(
            "/experts/categories/list",
            get(experts::list_categories::<E, L>),
        )
        .route("/experts/:id", get(experts::get_expert::<E, L>))
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_bookings::<E, L>).post(bookings::create_booking::<E, L>),
        )
        .route(
            "/bookings/:id/status",
            patch(bookings::update_booking_status::<E, L>),
        )
        // Real-time channel
        .route("/ws", get(realtime::realtime_handler::<E, L>));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .layer(correlation_id_layer())
}
