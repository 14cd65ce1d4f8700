//! Reservation service behaviour against the in-memory stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use expert_booking_core::{
    BookingError, BookingId, BookingStatus, Category, Expert, ExpertId, FieldError, ReserveError,
    ReservationService, SlotStore, StoreError, StoreResult, SubscriptionRegistry,
};
use expert_booking_testing::{
    InMemoryBookingLedger, InMemoryExpertStore, SequenceClock, capture_logs, fixtures, test_time,
};
use std::sync::Arc;

const ORPHAN_LOG: &str = "Slot reserved but booking was not recorded";

type Service = ReservationService<InMemoryExpertStore, InMemoryBookingLedger>;

struct Harness {
    store: Arc<InMemoryExpertStore>,
    ledger: Arc<InMemoryBookingLedger>,
    registry: Arc<SubscriptionRegistry>,
    service: Service,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryExpertStore::new());
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let registry = Arc::new(SubscriptionRegistry::default());
    let service = ReservationService::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        Arc::clone(&registry),
        Arc::new(SequenceClock::starting_at(test_time())),
    );
    Harness {
        store,
        ledger,
        registry,
        service,
    }
}

#[tokio::test]
async fn test_successful_reservation_records_pending_booking() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut request = fixtures::reservation_for(&expert, 2);
    request.email = " Ada@Example.COM ".to_string();
    request.notes = None;

    let booking = h.service.create_reservation(request).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.expert_name, "Dr. Sarah Chen");
    assert_eq!(booking.email, "ada@example.com");
    assert_eq!(booking.notes, "");
    assert_eq!(booking.created_at, booking.updated_at);
    assert_eq!(h.ledger.all(), vec![booking.clone()]);

    let stored = h.store.expert(expert.id).unwrap();
    assert!(stored.slot(&booking.date, &booking.time_slot).unwrap().is_booked);
    assert_eq!(stored.free_slot_count(), expert.free_slot_count() - 1);
}

#[tokio::test]
async fn test_second_reservation_of_same_slot_conflicts() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    h.service
        .create_reservation(fixtures::reservation_for(&expert, 0))
        .await
        .unwrap();
    let err = h
        .service
        .create_reservation(fixtures::reservation_for(&expert, 0))
        .await
        .unwrap_err();

    assert_eq!(err, BookingError::SlotConflict);
    assert_eq!(h.ledger.len(), 1);
}

#[tokio::test]
async fn test_unknown_expert_is_not_found() {
    let h = harness();
    let expert = fixtures::sample_expert();
    // Never inserted

    let err = h
        .service
        .create_reservation(fixtures::reservation_for(&expert, 0))
        .await
        .unwrap_err();

    assert_eq!(err, BookingError::ExpertNotFound);
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn test_nonexistent_slot_on_known_expert_conflicts() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut request = fixtures::reservation_for(&expert, 0);
    request.time_slot = "11:45 PM".to_string();

    let err = h.service.create_reservation(request).await.unwrap_err();
    assert_eq!(err, BookingError::SlotConflict);
}

#[tokio::test]
async fn test_validation_reports_every_field_and_touches_nothing() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut request = fixtures::reservation_for(&expert, 0);
    request.email = "nope".to_string();
    request.phone = "   ".to_string();

    let err = h.service.create_reservation(request).await.unwrap_err();
    assert_eq!(
        err,
        BookingError::ValidationFailed(vec![
            FieldError::new("email", "Valid email is required"),
            FieldError::new("phone", "Phone number is required"),
        ])
    );
    assert_eq!(h.store.reserve_calls(), 0);
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn test_malformed_expert_id_is_validation_not_internal() {
    let h = harness();
    let expert = fixtures::sample_expert();
    let mut request = fixtures::reservation_for(&expert, 0);
    request.expert_id = "abc123".to_string();

    let err = h.service.create_reservation(request).await.unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_store_outage_is_internal_error() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());
    h.store.fail_reads(true);

    let (logs, _guard) = capture_logs();
    let err = h
        .service
        .create_reservation(fixtures::reservation_for(&expert, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "INTERNAL_ERROR");
    // Nothing was flipped, so this is not an orphaned slot
    assert!(logs.contains("Slot reservation failed"));
    assert!(!logs.contains(ORPHAN_LOG));
}

#[tokio::test]
async fn test_ledger_failure_after_flip_leaves_slot_reserved() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());
    h.ledger.fail_writes(true);

    let mut subscriber = h.registry.connect();
    h.registry.subscribe(subscriber.id(), expert.id).unwrap();

    let request = fixtures::reservation_for(&expert, 1);
    let (date, time) = (request.date.clone(), request.time_slot.clone());
    let (logs, _guard) = capture_logs();
    let err = h.service.create_reservation(request).await.unwrap_err();

    assert!(matches!(err, BookingError::Store(_)));
    assert!(logs.contains(ORPHAN_LOG));
    assert!(logs.contains(&expert.id.to_string()));
    assert!(h.ledger.is_empty());
    // The flip is not rolled back
    let stored = h.store.expert(expert.id).unwrap();
    assert!(stored.slot(&date, &time).unwrap().is_booked);
    // Nothing was announced for a booking that does not exist
    assert!(subscriber.try_recv().is_none());
}

/// Flips through the in-memory store, then loses the connection before the read-back.
struct ReloadFails(Arc<InMemoryExpertStore>);

impl SlotStore for ReloadFails {
    async fn reserve_if_free(
        &self,
        expert_id: ExpertId,
        date: &str,
        time: &str,
    ) -> Result<Option<Expert>, ReserveError> {
        match self.0.reserve_if_free(expert_id, date, time).await? {
            Some(_) => Err(ReserveError::Reload(StoreError::Unavailable(
                "connection reset after update".to_string(),
            ))),
            None => Ok(None),
        }
    }

    async fn find_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        self.0.find_expert(expert_id).await
    }
}

#[tokio::test]
async fn test_reload_failure_after_flip_is_an_orphaned_slot() {
    let store = Arc::new(InMemoryExpertStore::new());
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let registry = Arc::new(SubscriptionRegistry::default());
    let expert = fixtures::sample_expert();
    store.insert_expert(expert.clone());

    let service = ReservationService::new(
        Arc::new(ReloadFails(Arc::clone(&store))),
        Arc::clone(&ledger),
        Arc::clone(&registry),
        Arc::new(SequenceClock::starting_at(test_time())),
    );
    let mut subscriber = registry.connect();
    registry.subscribe(subscriber.id(), expert.id).unwrap();

    let request = fixtures::reservation_for(&expert, 2);
    let (date, time) = (request.date.clone(), request.time_slot.clone());
    let (logs, _guard) = capture_logs();
    let err = service.create_reservation(request).await.unwrap_err();

    assert_eq!(
        err,
        BookingError::Store(StoreError::Unavailable(
            "connection reset after update".to_string()
        ))
    );
    assert!(logs.contains(ORPHAN_LOG));
    assert!(logs.contains(&date));
    assert!(!logs.contains("Slot reservation failed"));

    assert!(store.expert(expert.id).unwrap().slot(&date, &time).unwrap().is_booked);
    assert!(ledger.is_empty());
    assert!(subscriber.try_recv().is_none());
}

#[tokio::test]
async fn test_subscriber_receives_public_projection() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut subscriber = h.registry.connect();
    h.registry.subscribe(subscriber.id(), expert.id).unwrap();

    let booking = h
        .service
        .create_reservation(fixtures::reservation_for(&expert, 3))
        .await
        .unwrap();

    let event = subscriber.recv().await.unwrap();
    assert_eq!(event.expert_id, expert.id);
    assert_eq!(event.date, booking.date);
    assert_eq!(event.time_slot, booking.time_slot);
    assert_eq!(event.booking, booking.public_view());
}

#[tokio::test]
async fn test_update_status_any_to_any() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());
    let booking = h
        .service
        .create_reservation(fixtures::reservation_for(&expert, 0))
        .await
        .unwrap();
    let id = booking.id.to_string();

    let completed = h.service.update_status(&id, "completed").await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
    assert!(completed.updated_at > booking.updated_at);

    let back = h.service.update_status(&id, "pending").await.unwrap();
    assert_eq!(back.status, BookingStatus::Pending);
    assert_eq!(back.created_at, booking.created_at);
}

#[tokio::test]
async fn test_update_status_errors() {
    let h = harness();

    let err = h
        .service
        .update_status(&BookingId::new().to_string(), "archived")
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::InvalidStatus("archived".to_string()));

    let err = h
        .service
        .update_status(&BookingId::new().to_string(), "confirmed")
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::BookingNotFound);

    let err = h.service.update_status("42", "confirmed").await.unwrap_err();
    assert_eq!(err, BookingError::invalid_field("id", "Invalid booking ID format"));
}

#[tokio::test]
async fn test_lookup_by_email_is_case_and_whitespace_insensitive() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut request = fixtures::reservation_for(&expert, 0);
    request.email = " Foo@Bar.com ".to_string();
    let booking = h.service.create_reservation(request).await.unwrap();

    let found = h.service.list_by_contact("foo@bar.com").await.unwrap();
    assert_eq!(found, vec![booking]);

    let found = h.service.list_by_contact("  FOO@BAR.COM").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_lookup_is_newest_first_and_empty_when_unknown() {
    let h = harness();
    let expert = fixtures::sample_expert();
    h.store.insert_expert(expert.clone());

    let mut ids = Vec::new();
    for slot in 0..3 {
        let booking = h
            .service
            .create_reservation(fixtures::reservation_for(&expert, slot))
            .await
            .unwrap();
        ids.push(booking.id);
    }
    ids.reverse();

    let found: Vec<_> = h
        .service
        .list_by_contact("ada@example.com")
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(found, ids);

    assert!(h.service.list_by_contact("nobody@example.com").await.unwrap().is_empty());
    assert!(h.service.list_by_contact("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_other_experts_unaffected_by_reservation() {
    let h = harness();
    let first = fixtures::sample_expert();
    let second = fixtures::expert("Alex Kim", Category::Design, 4.9);
    h.store.insert_expert(first.clone());
    h.store.insert_expert(second.clone());

    h.service
        .create_reservation(fixtures::reservation_for(&first, 0))
        .await
        .unwrap();

    // Same (date, time) on a different expert is still free
    let booking = h
        .service
        .create_reservation(fixtures::reservation_for(&second, 0))
        .await
        .unwrap();
    assert_eq!(booking.expert_id, second.id);
}
