//! Error types for reservation, ledger and fan-out operations.

use crate::types::ConnectionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for reservation service operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One violated field constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as submitted by the client (e.g. `timeSlot`)
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures of the backing store.
///
/// These are transient or operational; the core never retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query or statement failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped back to a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Error taxonomy of the reservation service.
///
/// Every variant maps to one short machine-checkable kind (see [`BookingError::kind`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Client-supplied data violates one or more field constraints.
    #[error("Validation failed")]
    ValidationFailed(Vec<FieldError>),

    /// The referenced expert does not exist.
    #[error("Expert not found")]
    ExpertNotFound,

    /// The referenced booking does not exist.
    #[error("Booking not found")]
    BookingNotFound,

    /// The expert exists but the slot was already reserved.
    #[error("This time slot is no longer available. It may have been booked by someone else.")]
    SlotConflict,

    /// Requested status is not one of pending, confirmed, completed.
    #[error("Invalid status '{0}'. Must be one of: pending, confirmed, completed")]
    InvalidStatus(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BookingError {
    /// Build a validation failure for a single field.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![FieldError::new(field, message)])
    }

    /// Short machine-checkable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_ERROR",
            Self::ExpertNotFound => "EXPERT_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::SlotConflict => "SLOT_CONFLICT",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }
}

/// Failure of [`SlotStore::reserve_if_free`](crate::store::SlotStore::reserve_if_free).
///
/// The two variants differ in whether the slot was left booked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReserveError {
    /// Nothing was written; the slot is as it was.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The slot was flipped to booked but the expert could not be read back.
    #[error("Slot reserved but expert could not be reloaded: {0}")]
    Reload(StoreError),
}

/// Errors from the subscription registry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection was never registered or has already disconnected.
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),
}
