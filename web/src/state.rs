//! Application state for Axum handlers.

use expert_booking_core::{
    BookingLedger, Clock, ExpertCatalog, ListingLimits, ReservationService, SlotStore,
    SubscriptionRegistry,
};
use std::sync::Arc;

/// Default cap on simultaneous real-time connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 1000;

/// Application state shared across all HTTP handlers.
///
/// `E` is the expert store (slots and catalogue), `L` the booking ledger. Both
/// are shared behind `Arc`, so cloning the state per request is cheap.
pub struct AppState<E, L> {
    /// Reservation, status update and contact lookup
    pub reservations: ReservationService<E, L>,
    /// Read side of the expert catalogue
    pub catalog: Arc<E>,
    /// Live connections and their expert subscriptions
    pub registry: Arc<SubscriptionRegistry>,
    /// Page size defaults for expert listings
    pub listing: ListingLimits,
    /// Upgrades beyond this many open connections are refused
    pub max_connections: usize,
}

impl<E, L> Clone for AppState<E, L> {
    fn clone(&self) -> Self {
        Self {
            reservations: self.reservations.clone(),
            catalog: Arc::clone(&self.catalog),
            registry: Arc::clone(&self.registry),
            listing: self.listing,
            max_connections: self.max_connections,
        }
    }
}

impl<E, L> AppState<E, L>
where
    E: SlotStore + ExpertCatalog,
    L: BookingLedger,
{
    /// Wire the reservation service and catalogue onto one expert store.
    #[must_use]
    pub fn new(
        experts: Arc<E>,
        ledger: Arc<L>,
        registry: Arc<SubscriptionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reservations =
            ReservationService::new(Arc::clone(&experts), ledger, Arc::clone(&registry), clock);
        Self {
            reservations,
            catalog: experts,
            registry,
            listing: ListingLimits::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Override the listing page size defaults.
    #[must_use]
    pub const fn with_listing_limits(mut self, listing: ListingLimits) -> Self {
        self.listing = listing;
        self
    }

    /// Override the real-time connection cap.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expert_booking_testing::{InMemoryBookingLedger, InMemoryExpertStore, test_clock};

    #[test]
    fn test_state_shares_one_registry() {
        let state = AppState::new(
            Arc::new(InMemoryExpertStore::new()),
            Arc::new(InMemoryBookingLedger::new()),
            Arc::new(SubscriptionRegistry::default()),
            Arc::new(test_clock()),
        )
        .with_max_connections(2);

        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.registry, &clone.registry));
        assert!(Arc::ptr_eq(&state.registry, state.reservations.registry()));
        assert_eq!(clone.max_connections, 2);
    }
}
