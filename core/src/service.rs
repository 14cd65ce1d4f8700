//! Reservation service.
//!
//! Orchestrates validation, the atomic slot flip, the ledger write and the
//! `slotBooked` fan-out. All store failures are translated into
//! [`BookingError`] here; nothing below this layer crosses the API boundary raw.

use crate::environment::Clock;
use crate::error::{BookingError, ReserveError, Result, StoreError};
use crate::registry::SubscriptionRegistry;
use crate::store::{BookingLedger, SlotStore};
use crate::types::{
    Booking, BookingId, BookingStatus, ExpertId, ReservationRequest, SlotBooked,
};
use crate::validation::{normalize_email, validate_reservation};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Reservation service.
///
/// # Type Parameters
///
/// - `S`: Slot store providing the atomic reserve-if-free operation
/// - `L`: Booking ledger
pub struct ReservationService<S, L> {
    slots: Arc<S>,
    ledger: Arc<L>,
    registry: Arc<SubscriptionRegistry>,
    clock: Arc<dyn Clock>,
}

impl<S, L> Clone for ReservationService<S, L> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            ledger: Arc::clone(&self.ledger),
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, L> ReservationService<S, L>
where
    S: SlotStore,
    L: BookingLedger,
{
    /// Create a new reservation service.
    #[must_use]
    pub fn new(
        slots: Arc<S>,
        ledger: Arc<L>,
        registry: Arc<SubscriptionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            slots,
            ledger,
            registry,
            clock,
        }
    }

    /// The registry events are published to.
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Reserve a slot and record the booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::ValidationFailed`]: one entry per offending field
    /// - [`BookingError::ExpertNotFound`]: no expert with that id
    /// - [`BookingError::SlotConflict`]: the expert exists but the slot is taken (or unknown)
    /// - [`BookingError::Store`]: the store failed; if this happens after the flip,
    ///   the slot stays reserved without a booking
    #[instrument(skip(self, request), fields(expert_id = %request.expert_id, date = %request.date, time_slot = %request.time_slot))]
    pub async fn create_reservation(&self, request: ReservationRequest) -> Result<Booking> {
        let started = Instant::now();

        let valid = validate_reservation(&request).map_err(|errors| {
            metrics::counter!("booking_validation_failures_total").increment(1);
            debug!(violations = errors.len(), "Reservation rejected by validation");
            BookingError::ValidationFailed(errors)
        })?;

        let reserved = match self
            .slots
            .reserve_if_free(valid.expert_id, &valid.date, &valid.time_slot)
            .await
        {
            Ok(reserved) => reserved,
            Err(ReserveError::Store(e)) => {
                error!(error = %e, "Slot reservation failed");
                return Err(BookingError::Store(e));
            }
            Err(ReserveError::Reload(e)) => {
                report_orphaned_slot(&e, valid.expert_id, &valid.date, &valid.time_slot);
                return Err(BookingError::Store(e));
            }
        };

        let Some(expert) = reserved else {
            // No match: decide between a missing expert and a lost race
            let exists = self.slots.find_expert(valid.expert_id).await.map_err(|e| {
                error!(error = %e, "Expert lookup failed");
                BookingError::Store(e)
            })?;
            return Err(if exists.is_some() {
                metrics::counter!("booking_conflicts_total").increment(1);
                debug!("Slot already reserved");
                BookingError::SlotConflict
            } else {
                debug!("Expert not found");
                BookingError::ExpertNotFound
            });
        };

        let now = self.clock.now();
        let booking = Booking {
            id: BookingId::new(),
            expert_id: expert.id,
            expert_name: expert.name,
            user_name: valid.user_name,
            email: valid.email,
            phone: valid.phone,
            date: valid.date,
            time_slot: valid.time_slot,
            notes: valid.notes,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.ledger.append(&booking).await {
            report_orphaned_slot(&e, booking.expert_id, &booking.date, &booking.time_slot);
            return Err(BookingError::Store(e));
        }

        let report = self.registry.publish(
            booking.expert_id,
            SlotBooked {
                expert_id: booking.expert_id,
                date: booking.date.clone(),
                time_slot: booking.time_slot.clone(),
                booking: booking.public_view(),
            },
        );

        metrics::counter!("bookings_created_total").increment(1);
        metrics::histogram!("reservation_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            booking_id = %booking.id,
            delivered = report.delivered,
            dropped = report.dropped,
            "Booking created"
        );

        Ok(booking)
    }

    /// Set the status of a booking. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidStatus`]: `status` is not pending, confirmed or completed
    /// - [`BookingError::ValidationFailed`]: `booking_id` is not a well-formed id
    /// - [`BookingError::BookingNotFound`]: no booking with that id
    /// - [`BookingError::Store`]: the store failed
    #[instrument(skip(self))]
    pub async fn update_status(&self, booking_id: &str, status: &str) -> Result<Booking> {
        let status: BookingStatus = status.trim().parse()?;
        let booking_id: BookingId = booking_id
            .parse()
            .map_err(|_| BookingError::invalid_field("id", "Invalid booking ID format"))?;

        let updated = self
            .ledger
            .update_status(booking_id, status, self.clock.now())
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        info!(booking_id = %updated.id, status = %updated.status, "Booking status updated");
        Ok(updated)
    }

    /// Bookings made with `email`, newest first.
    ///
    /// Matching ignores case and surrounding whitespace. A blank email yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the ledger query fails.
    pub async fn list_by_contact(&self, email: &str) -> Result<Vec<Booking>> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.ledger.find_by_email(&email).await?)
    }
}

/// A slot is booked but no booking references it.
fn report_orphaned_slot(error: &StoreError, expert_id: ExpertId, date: &str, time_slot: &str) {
    metrics::counter!("booking_orphaned_slots_total").increment(1);
    error!(
        error = %error,
        expert_id = %expert_id,
        date,
        time_slot,
        "Slot reserved but booking was not recorded"
    );
}
