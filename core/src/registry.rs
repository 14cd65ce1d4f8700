//! Subscription registry and `slotBooked` fan-out.
//!
//! The registry tracks which live connections watch which expert. Each
//! connection owns a bounded queue; [`SubscriptionRegistry::publish`] enqueues
//! with `try_send` so a slow or dead consumer can never stall a reservation.
//!
//! # Architecture
//!
//! ```text
//! ReservationService                 SubscriptionRegistry               Connections
//!        │                                    │                              │
//!        ├─ publish(expert A, event) ────────>│                              │
//!        │                                    ├─ rooms[A] = {c1, c3}         │
//!        │                                    ├─ try_send ──────────────────>│ c1 queue
//!        │                                    ├─ try_send ──────────────────>│ c3 queue
//!        │<─ PublishReport { delivered: 2 } ──┤                              │
//! ```
//!
//! All state sits behind one mutex. Publishes are therefore serialised and the
//! events of one expert reach each queue in call order.

use crate::error::RegistryError;
use crate::types::{ConnectionId, ExpertId, SlotBooked};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default per-connection queue capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Outcome of one [`SubscriptionRegistry::publish`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Connections whose queue accepted the event
    pub delivered: usize,
    /// Subscribed connections that missed it (queue full or closed)
    pub dropped: usize,
}

struct Connection {
    tx: mpsc::Sender<Arc<SlotBooked>>,
    experts: HashSet<ExpertId>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<ExpertId, HashSet<ConnectionId>>,
}

impl RegistryState {
    fn remove_connection(&mut self, connection_id: ConnectionId) -> bool {
        let Some(connection) = self.connections.remove(&connection_id) else {
            return false;
        };
        for expert_id in connection.experts {
            self.leave_room(expert_id, connection_id);
        }
        true
    }

    fn leave_room(&mut self, expert_id: ExpertId, connection_id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(&expert_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                self.rooms.remove(&expert_id);
            }
        }
    }
}

/// Registry of live connections and their expert subscriptions.
///
/// Constructed once at process start, shared by `Arc`, and torn down with
/// [`SubscriptionRegistry::shutdown`].
///
/// # Example
///
/// ```
/// use expert_booking_core::{ExpertId, SubscriptionRegistry};
///
/// let registry = SubscriptionRegistry::new(16);
/// let subscriber = registry.connect();
/// let expert = ExpertId::new();
///
/// assert_eq!(registry.subscribe(subscriber.id(), expert), Ok(true));
/// assert_eq!(registry.subscribe(subscriber.id(), expert), Ok(false));
/// assert_eq!(registry.subscriber_count(expert), 1);
/// ```
pub struct SubscriptionRegistry {
    state: Mutex<RegistryState>,
    next_id: AtomicU64,
    capacity: usize,
}

impl SubscriptionRegistry {
    /// Create a registry whose connections buffer up to `capacity` events each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Every mutation leaves the maps consistent, so a poisoned guard is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new live connection.
    pub fn connect(&self) -> Subscriber {
        let id = ConnectionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);

        let count = {
            let mut state = self.lock();
            state.connections.insert(
                id,
                Connection {
                    tx,
                    experts: HashSet::new(),
                },
            );
            state.connections.len()
        };

        #[allow(clippy::cast_precision_loss)] // Connection counts stay far below 2^52
        metrics::gauge!("realtime_connections").set(count as f64);
        debug!(connection_id = %id, "Connection registered");

        Subscriber { id, rx }
    }

    /// Add `connection_id` to the group of `expert_id`.
    ///
    /// Returns `Ok(true)` if membership changed, `Ok(false)` if it was already a member.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownConnection`] if the connection is not registered.
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        expert_id: ExpertId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.lock();
        let connection = state
            .connections
            .get_mut(&connection_id)
            .ok_or(RegistryError::UnknownConnection(connection_id))?;

        if !connection.experts.insert(expert_id) {
            return Ok(false);
        }
        state.rooms.entry(expert_id).or_default().insert(connection_id);
        debug!(connection_id = %connection_id, expert_id = %expert_id, "Joined expert room");
        Ok(true)
    }

    /// Remove `connection_id` from the group of `expert_id`.
    ///
    /// Unsubscribing a non-member is a no-op returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownConnection`] if the connection is not registered.
    pub fn unsubscribe(
        &self,
        connection_id: ConnectionId,
        expert_id: ExpertId,
    ) -> Result<bool, RegistryError> {
        let mut state = self.lock();
        let connection = state
            .connections
            .get_mut(&connection_id)
            .ok_or(RegistryError::UnknownConnection(connection_id))?;

        if !connection.experts.remove(&expert_id) {
            return Ok(false);
        }
        state.leave_room(expert_id, connection_id);
        debug!(connection_id = %connection_id, expert_id = %expert_id, "Left expert room");
        Ok(true)
    }

    /// Deliver `event` to every connection currently subscribed to `expert_id`.
    ///
    /// Never blocks. Full queues drop the event for that connection; closed
    /// queues are pruned from the registry.
    pub fn publish(&self, expert_id: ExpertId, event: SlotBooked) -> PublishReport {
        let event = Arc::new(event);
        let mut report = PublishReport::default();
        let mut closed = Vec::new();

        let mut state = self.lock();
        if let Some(members) = state.rooms.get(&expert_id) {
            for connection_id in members {
                let Some(connection) = state.connections.get(connection_id) else {
                    continue;
                };
                match connection.tx.try_send(Arc::clone(&event)) {
                    Ok(()) => report.delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(connection_id = %connection_id, expert_id = %expert_id, "Subscriber queue full, dropping event");
                        report.dropped += 1;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        closed.push(*connection_id);
                        report.dropped += 1;
                    }
                }
            }
        }

        for connection_id in closed {
            state.remove_connection(connection_id);
            debug!(connection_id = %connection_id, "Pruned closed connection");
        }
        let count = state.connections.len();
        drop(state);

        metrics::counter!("slot_events_published_total").increment(report.delivered as u64);
        metrics::counter!("slot_events_dropped_total").increment(report.dropped as u64);
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("realtime_connections").set(count as f64);

        report
    }

    /// Tear down every membership of a connection and forget it.
    ///
    /// Returns `false` if the connection was unknown.
    pub fn disconnect(&self, connection_id: ConnectionId) -> bool {
        let (removed, count) = {
            let mut state = self.lock();
            let removed = state.remove_connection(connection_id);
            (removed, state.connections.len())
        };

        if removed {
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!("realtime_connections").set(count as f64);
            debug!(connection_id = %connection_id, "Connection disconnected");
        }
        removed
    }

    /// Disconnect every connection. Their subscribers observe end-of-stream.
    pub fn shutdown(&self) {
        let dropped = {
            let mut state = self.lock();
            let dropped = state.connections.len();
            state.connections.clear();
            state.rooms.clear();
            dropped
        };
        metrics::gauge!("realtime_connections").set(0.0);
        info!(connections = dropped, "Subscription registry shut down");
    }

    /// Number of live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Number of connections subscribed to `expert_id`.
    #[must_use]
    pub fn subscriber_count(&self, expert_id: ExpertId) -> usize {
        self.lock().rooms.get(&expert_id).map_or(0, HashSet::len)
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("connections", &self.connection_count())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Receiving end of one live connection.
#[derive(Debug)]
pub struct Subscriber {
    id: ConnectionId,
    rx: mpsc::Receiver<Arc<SlotBooked>>,
}

impl Subscriber {
    /// Connection ID to use with the registry.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the connection has been disconnected and the queue drained.
    pub async fn recv(&mut self) -> Option<Arc<SlotBooked>> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<SlotBooked>> {
        self.rx.try_recv().ok()
    }
}
