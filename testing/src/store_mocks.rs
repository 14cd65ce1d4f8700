//! In-memory store implementations.
//!
//! - [`InMemoryExpertStore`]: `HashMap`-backed [`SlotStore`] and [`ExpertCatalog`]
//! - [`InMemoryBookingLedger`]: `Vec`-backed [`BookingLedger`]
//!
//! Both support failure injection so tests can drive the store-error paths.

use expert_booking_core::error::{ReserveError, StoreError, StoreResult};
use expert_booking_core::listing::{ExpertQuery, Page};
use expert_booking_core::store::{BookingLedger, ExpertCatalog, SlotStore};
use expert_booking_core::types::{
    Booking, BookingId, BookingStatus, Category, Expert, ExpertId, ExpertSummary,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory expert store.
///
/// The match and the flip in [`SlotStore::reserve_if_free`] happen under one
/// lock acquisition, mirroring the single conditional update of the SQL store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExpertStore {
    experts: Arc<Mutex<HashMap<ExpertId, Expert>>>,
    fail_reads: Arc<AtomicBool>,
    reserve_calls: Arc<AtomicUsize>,
}

impl InMemoryExpertStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `experts`.
    #[must_use]
    pub fn with_experts(experts: impl IntoIterator<Item = Expert>) -> Self {
        let store = Self::new();
        for expert in experts {
            store.insert_expert(expert);
        }
        store
    }

    /// Insert or replace an expert.
    pub fn insert_expert(&self, expert: Expert) {
        lock(&self.experts).insert(expert.id, expert);
    }

    /// Snapshot of an expert (for assertions).
    #[must_use]
    pub fn expert(&self, expert_id: ExpertId) -> Option<Expert> {
        lock(&self.experts).get(&expert_id).cloned()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of `reserve_if_free` calls so far.
    #[must_use]
    pub fn reserve_calls(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected store failure".to_string()));
        }
        Ok(())
    }
}

impl SlotStore for InMemoryExpertStore {
    async fn reserve_if_free(
        &self,
        expert_id: ExpertId,
        date: &str,
        time: &str,
    ) -> Result<Option<Expert>, ReserveError> {
        self.check_available()?;
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);

        let mut experts = lock(&self.experts);
        let Some(expert) = experts.get_mut(&expert_id) else {
            return Ok(None);
        };
        let Some(slot) = expert
            .available_slots
            .iter_mut()
            .find(|s| s.matches(date, time) && !s.is_booked)
        else {
            return Ok(None);
        };
        slot.is_booked = true;
        Ok(Some(expert.clone()))
    }

    async fn find_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        self.check_available()?;
        Ok(self.expert(expert_id))
    }
}

fn by_rating_then_name(a: &Expert, b: &Expert) -> CmpOrdering {
    b.rating
        .partial_cmp(&a.rating)
        .unwrap_or(CmpOrdering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

impl ExpertCatalog for InMemoryExpertStore {
    async fn list_experts(&self, query: &ExpertQuery) -> StoreResult<Page<ExpertSummary>> {
        self.check_available()?;

        let mut matching: Vec<Expert> = lock(&self.experts)
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        matching.sort_by(by_rating_then_name);

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .iter()
            .skip(offset)
            .take(query.limit as usize)
            .map(Expert::summary)
            .collect();

        Ok(Page::new(items, query, total))
    }

    async fn get_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        self.check_available()?;
        Ok(self.expert(expert_id))
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.check_available()?;
        let in_use: BTreeSet<&'static str> = lock(&self.experts)
            .values()
            .map(|e| e.category.as_str())
            .collect();
        Ok(in_use.into_iter().filter_map(|c| c.parse().ok()).collect())
    }
}

/// In-memory booking ledger.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingLedger {
    bookings: Arc<Mutex<Vec<Booking>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryBookingLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every booking, in insertion order (for assertions).
    #[must_use]
    pub fn all(&self) -> Vec<Booking> {
        lock(&self.bookings).clone()
    }

    /// Number of bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.bookings).len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.bookings).is_empty()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl BookingLedger for InMemoryBookingLedger {
    async fn append(&self, booking: &Booking) -> StoreResult<()> {
        self.check_writable()?;
        lock(&self.bookings).push(booking.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>> {
        self.check_writable()?;
        let mut bookings = lock(&self.bookings);
        let Some(booking) = bookings.iter_mut().find(|b| b.id == booking_id) else {
            return Ok(None);
        };
        booking.status = status;
        booking.updated_at = updated_at;
        Ok(Some(booking.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Booking>> {
        // Reverse insertion order first so equal timestamps keep newest-inserted first
        let mut found: Vec<Booking> = lock(&self.bookings)
            .iter()
            .rev()
            .filter(|b| b.email == email)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_reserve_flips_once() {
        let expert = fixtures::sample_expert();
        let slot = expert.available_slots[0].clone();
        let store = InMemoryExpertStore::with_experts([expert.clone()]);

        let first = store.reserve_if_free(expert.id, &slot.date, &slot.time).await.unwrap();
        assert!(first.unwrap().slot(&slot.date, &slot.time).unwrap().is_booked);

        let second = store.reserve_if_free(expert.id, &slot.date, &slot.time).await.unwrap();
        assert!(second.is_none());
        assert_eq!(store.reserve_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryExpertStore::new();
        store.fail_reads(true);
        assert!(store.find_expert(ExpertId::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_catalog_orders_by_rating_then_name() {
        let store = InMemoryExpertStore::with_experts(fixtures::catalogue());
        let page = store.list_experts(&ExpertQuery::default()).await.unwrap();

        let ratings: Vec<f64> = page.items.iter().map(|e| e.rating).collect();
        let mut sorted = ratings.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(ratings, sorted);
        assert_eq!(page.items.len(), 6);
    }
}
