//! Store traits.
//!
//! The reservation service depends on these traits only. PostgreSQL backs them
//! in production and in-memory maps back them in tests.
//!
//! # Implementation Notes
//!
//! **CRITICAL**: [`SlotStore::reserve_if_free`] must be one indivisible
//! operation against the backing store: a conditional update whose predicate
//! includes the free flag (`UPDATE ... WHERE is_booked = FALSE RETURNING`), or a
//! match-and-flip under a single lock. A read followed by a separate write lets
//! two concurrent callers both see the slot as free.

use crate::error::{ReserveError, StoreResult};
use crate::listing::{ExpertQuery, Page};
use crate::types::{Booking, BookingId, BookingStatus, Category, Expert, ExpertId, ExpertSummary};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Per-expert slot storage with an atomic reserve-if-free operation.
pub trait SlotStore: Send + Sync {
    /// Atomically flip the (expert, date, time) slot from free to booked.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Expert))`: the slot was free and is now booked; the post-update expert
    /// - `Ok(None)`: no expert with that id, no such slot, or the slot was already booked
    ///
    /// `None` does not say which of the three applied. Callers disambiguate with
    /// [`SlotStore::find_expert`].
    ///
    /// # Errors
    ///
    /// - [`ReserveError::Store`]: the flip did not happen
    /// - [`ReserveError::Reload`]: the slot is now booked but the expert could not
    ///   be read back
    fn reserve_if_free(
        &self,
        expert_id: ExpertId,
        date: &str,
        time: &str,
    ) -> impl Future<Output = Result<Option<Expert>, ReserveError>> + Send;

    /// Look up an expert with its full slot list.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store is unreachable or a row is corrupt.
    fn find_expert(
        &self,
        expert_id: ExpertId,
    ) -> impl Future<Output = StoreResult<Option<Expert>>> + Send;
}

/// Read side of the expert catalogue.
pub trait ExpertCatalog: Send + Sync {
    /// List expert summaries matching a query, ordered by rating descending then name.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store fails.
    fn list_experts(
        &self,
        query: &ExpertQuery,
    ) -> impl Future<Output = StoreResult<Page<ExpertSummary>>> + Send;

    /// Full expert record, slots ordered by (date, time).
    ///
    /// # Errors
    ///
    /// Returns error if the backing store fails.
    fn get_expert(
        &self,
        expert_id: ExpertId,
    ) -> impl Future<Output = StoreResult<Option<Expert>>> + Send;

    /// Distinct categories currently in use, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store fails.
    fn categories(&self) -> impl Future<Output = StoreResult<Vec<Category>>> + Send;
}

/// Append-mostly booking records.
///
/// Only `status` and `updated_at` change after [`BookingLedger::append`].
pub trait BookingLedger: Send + Sync {
    /// Persist a new booking.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn append(&self, booking: &Booking) -> impl Future<Output = StoreResult<()>> + Send;

    /// Set the status of a booking and stamp `updated_at`.
    ///
    /// Returns `Ok(None)` if no booking has that id.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn update_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<Booking>>> + Send;

    /// Bookings whose contact email equals `email` (already normalised), newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_by_email(&self, email: &str) -> impl Future<Output = StoreResult<Vec<Booking>>> + Send;
}
