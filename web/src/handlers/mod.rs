//! HTTP request handlers.
//!
//! Handlers are organized by resource. Successful JSON bodies share the
//! [`ApiResponse`] envelope; failures go through [`AppError`](crate::AppError).

pub mod bookings;
pub mod experts;
pub mod health;
pub mod realtime;

use expert_booking_core::Pagination;
use serde::{Deserialize, Serialize};

// Re-export common handler utilities
pub use health::health_check;

/// Success envelope: `{success: true, message?, data, pagination?, total?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true`; failures use the error body instead
    pub success: bool,
    /// Human-readable confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload
    pub data: T,
    /// Page metadata for listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Number of records in `data` for unpaginated lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: None,
            total: None,
        }
    }

    /// Add a confirmation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add page metadata.
    #[must_use]
    pub const fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Add a record count.
    #[must_use]
    pub const fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}
