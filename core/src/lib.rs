//! # Expert Booking Core
//!
//! Domain types and the slot reservation protocol for the expert booking marketplace.
//!
//! This crate is the functional core of the system. It knows nothing about HTTP,
//! SQL or sockets: every external dependency is reached through a trait
//! ([`SlotStore`], [`ExpertCatalog`], [`BookingLedger`], [`Clock`]) so the same
//! logic runs against PostgreSQL in production and in-memory stores in tests.
//!
//! ## Components
//!
//! - **Slot Store** ([`store::SlotStore`]): per-expert slots with one atomic
//!   reserve-if-free operation
//! - **Reservation Service** ([`service::ReservationService`]): validation,
//!   reservation, ledger write, fan-out
//! - **Booking Ledger** ([`store::BookingLedger`]): append-only booking records
//!   queryable by contact email
//! - **Subscription Registry** ([`registry::SubscriptionRegistry`]): which live
//!   connections watch which expert, and the `slotBooked` fan-out
//!
//! ## Reservation Flow
//!
//! ```text
//! request ──> validate ──> reserve_if_free ──┬─> Some(expert) ──> append booking ──> publish ──> Booking
//!                                            │
//!                                            └─> None ──> find_expert ──┬─> None ──> ExpertNotFound
//!                                                                       └─> Some ──> SlotConflict
//! ```
//!
//! The no-double-booking guarantee lives entirely in `reserve_if_free`: the
//! free-flag is part of the match predicate of a single conditional update, so two
//! concurrent calls for the same (expert, date, time) triple can never both win.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod error;
pub mod listing;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use environment::{Clock, SystemClock};
pub use error::{
    BookingError, FieldError, RegistryError, ReserveError, Result, StoreError, StoreResult,
};
pub use listing::{CategoryFilter, ExpertQuery, ListingLimits, ListingParams, Page, Pagination};
pub use registry::{PublishReport, Subscriber, SubscriptionRegistry};
pub use service::ReservationService;
pub use store::{BookingLedger, ExpertCatalog, SlotStore};
pub use types::{
    Booking, BookingId, BookingStatus, BookingSummary, Category, ConnectionId, Expert, ExpertId,
    ExpertSummary, ReservationRequest, Slot, SlotBooked,
};
