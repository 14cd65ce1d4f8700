//! Subscription registry: scoping, idempotency, lifecycle.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use expert_booking_core::{
    BookingId, BookingStatus, BookingSummary, ExpertId, SlotBooked, SubscriptionRegistry,
};

fn event(expert_id: ExpertId, time: &str) -> SlotBooked {
    SlotBooked {
        expert_id,
        date: "2026-03-02".to_string(),
        time_slot: time.to_string(),
        booking: BookingSummary {
            id: BookingId::new(),
            user_name: "Grace".to_string(),
            date: "2026-03-02".to_string(),
            time_slot: time.to_string(),
            status: BookingStatus::Pending,
        },
    }
}

#[test]
fn test_fan_out_is_scoped_to_expert() {
    let registry = SubscriptionRegistry::default();
    let (a, b) = (ExpertId::new(), ExpertId::new());

    let mut watcher_a = registry.connect();
    let mut watcher_b = registry.connect();
    registry.subscribe(watcher_a.id(), a).unwrap();
    registry.subscribe(watcher_b.id(), b).unwrap();

    let report = registry.publish(b, event(b, "09:00 AM"));
    assert_eq!(report.delivered, 1);

    assert!(watcher_a.try_recv().is_none());
    assert_eq!(watcher_b.try_recv().unwrap().expert_id, b);
}

#[test]
fn test_double_subscribe_delivers_once() {
    let registry = SubscriptionRegistry::default();
    let expert = ExpertId::new();
    let mut watcher = registry.connect();

    assert!(registry.subscribe(watcher.id(), expert).unwrap());
    assert!(!registry.subscribe(watcher.id(), expert).unwrap());
    assert_eq!(registry.subscriber_count(expert), 1);

    registry.publish(expert, event(expert, "09:00 AM"));
    assert!(watcher.try_recv().is_some());
    assert!(watcher.try_recv().is_none());
}

#[test]
fn test_unsubscribe_then_publish_delivers_nothing() {
    let registry = SubscriptionRegistry::default();
    let expert = ExpertId::new();
    let mut watcher = registry.connect();

    registry.subscribe(watcher.id(), expert).unwrap();
    assert!(registry.unsubscribe(watcher.id(), expert).unwrap());
    assert!(!registry.unsubscribe(watcher.id(), expert).unwrap());

    let report = registry.publish(expert, event(expert, "09:00 AM"));
    assert_eq!(report.delivered, 0);
    assert!(watcher.try_recv().is_none());
}

#[test]
fn test_late_subscriber_gets_no_replay() {
    let registry = SubscriptionRegistry::default();
    let expert = ExpertId::new();
    registry.publish(expert, event(expert, "09:00 AM"));

    let mut watcher = registry.connect();
    registry.subscribe(watcher.id(), expert).unwrap();
    assert!(watcher.try_recv().is_none());
}

#[test]
fn test_connection_may_watch_many_experts() {
    let registry = SubscriptionRegistry::default();
    let (a, b) = (ExpertId::new(), ExpertId::new());
    let mut watcher = registry.connect();
    registry.subscribe(watcher.id(), a).unwrap();
    registry.subscribe(watcher.id(), b).unwrap();

    registry.publish(a, event(a, "09:00 AM"));
    registry.publish(b, event(b, "10:30 AM"));

    assert_eq!(watcher.try_recv().unwrap().expert_id, a);
    assert_eq!(watcher.try_recv().unwrap().expert_id, b);
}

#[test]
fn test_events_of_one_expert_arrive_in_publish_order() {
    let registry = SubscriptionRegistry::new(16);
    let expert = ExpertId::new();
    let mut watcher = registry.connect();
    registry.subscribe(watcher.id(), expert).unwrap();

    let times = ["09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM"];
    for time in times {
        registry.publish(expert, event(expert, time));
    }

    let received: Vec<String> = std::iter::from_fn(|| watcher.try_recv())
        .map(|e| e.time_slot.clone())
        .collect();
    assert_eq!(received, times);
}

#[test]
fn test_disconnect_removes_every_membership() {
    let registry = SubscriptionRegistry::default();
    let (a, b) = (ExpertId::new(), ExpertId::new());
    let watcher = registry.connect();
    let other = registry.connect();
    registry.subscribe(watcher.id(), a).unwrap();
    registry.subscribe(watcher.id(), b).unwrap();
    registry.subscribe(other.id(), a).unwrap();

    assert!(registry.disconnect(watcher.id()));
    assert_eq!(registry.subscriber_count(a), 1);
    assert_eq!(registry.subscriber_count(b), 0);
    assert_eq!(registry.connection_count(), 1);
    assert!(registry.subscribe(watcher.id(), a).is_err());
}
