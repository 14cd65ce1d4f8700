//! HTTP and real-time surface of the expert booking marketplace.
//!
//! This crate is the imperative shell around `expert-booking-core`: it parses
//! requests, calls the [`ReservationService`](expert_booking_core::ReservationService)
//! or the [`ExpertCatalog`](expert_booking_core::ExpertCatalog), and maps the outcome
//! to JSON responses.
//!
//! # Request Flow
//!
//! ```text
//! HTTP request ──> correlation id span ──> CORS ──> handler ──> service / catalog
//!                                                       │
//!      JSON response  <── AppError::from(BookingError) ─┘
//!
//! GET /api/ws ──> upgrade ──> registry.connect() ──> select { client frames, slotBooked events }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use expert_booking_web::{AppState, RouterConfig, build_router};
//!
//! let state = AppState::new(experts, ledger, registry, clock);
//! let app = build_router(state, &RouterConfig::default());
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, JsonBody};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer, cors_layer};
pub use router::{RouterConfig, build_router};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
