//! Forced-concurrency tests for the no-double-booking guarantee.
//!
//! Many tasks race for the same (expert, date, time) triple on a multi-threaded
//! runtime. Exactly one may win, and exactly one `slotBooked` event goes out.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use expert_booking_core::{BookingError, ReservationService, SubscriptionRegistry};
use expert_booking_testing::{
    InMemoryBookingLedger, InMemoryExpertStore, fixtures, init_test_tracing, test_clock,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Barrier;

const CONTENDERS: usize = 64;

struct Race {
    store: Arc<InMemoryExpertStore>,
    ledger: Arc<InMemoryBookingLedger>,
    registry: Arc<SubscriptionRegistry>,
    service: ReservationService<InMemoryExpertStore, InMemoryBookingLedger>,
}

fn race() -> Race {
    init_test_tracing();
    let store = Arc::new(InMemoryExpertStore::new());
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let registry = Arc::new(SubscriptionRegistry::default());
    let service = ReservationService::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        Arc::clone(&registry),
        Arc::new(test_clock()),
    );
    Race {
        store,
        ledger,
        registry,
        service,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_exactly_one_contender_wins_a_slot() {
    let Race {
        store,
        ledger,
        registry,
        service,
    } = race();
    let expert = fixtures::sample_expert();
    store.insert_expert(expert.clone());

    let mut watcher = registry.connect();
    registry.subscribe(watcher.id(), expert.id).unwrap();

    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let handles = (0..CONTENDERS).map(|i| {
        let service = service.clone();
        let barrier = Arc::clone(&barrier);
        let mut request = fixtures::reservation_for(&expert, 0);
        request.user_name = format!("Contender {i}");
        tokio::spawn(async move {
            barrier.wait().await;
            service.create_reservation(request).await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::SlotConflict)))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(conflicts, CONTENDERS - 1);
    assert_eq!(ledger.len(), 1);
    assert_eq!(store.reserve_calls(), CONTENDERS);

    // One announcement, for the booking that was recorded
    let recorded = ledger.all().remove(0);
    let event = watcher.try_recv().expect("winner publishes slotBooked");
    assert_eq!(event.booking.id, recorded.id);
    assert_eq!(event.expert_id, expert.id);
    assert!(watcher.try_recv().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_distinct_slots_all_succeed_under_contention() {
    let Race {
        store,
        ledger,
        service,
        ..
    } = race();
    let expert = fixtures::sample_expert();
    store.insert_expert(expert.clone());
    let slot_count = expert.available_slots.len();

    // Four contenders per slot
    let barrier = Arc::new(Barrier::new(slot_count * 4));
    let handles = (0..slot_count * 4).map(|i| {
        let service = service.clone();
        let barrier = Arc::clone(&barrier);
        let request = fixtures::reservation_for(&expert, i % slot_count);
        tokio::spawn(async move {
            barrier.wait().await;
            service.create_reservation(request).await
        })
    });

    let winners = join_all(handles)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();

    assert_eq!(winners, slot_count);
    assert_eq!(ledger.len(), slot_count);
    assert_eq!(store.expert(expert.id).unwrap().free_slot_count(), 0);

    // Every ledger entry names a distinct slot
    let mut keys: Vec<_> = ledger
        .all()
        .into_iter()
        .map(|b| (b.date, b.time_slot))
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), slot_count);
}
