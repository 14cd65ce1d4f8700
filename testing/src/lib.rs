//! # Expert Booking Testing
//!
//! Testing utilities for the expert booking marketplace.
//!
//! This crate provides:
//! - Deterministic clocks ([`FixedClock`], [`SequenceClock`])
//! - In-memory implementations of the store traits with failure injection
//! - Sample experts and reservation requests
//! - proptest strategies for contact fields
//!
//! ## Example
//!
//! ```
//! use expert_booking_testing::{fixtures, InMemoryBookingLedger, InMemoryExpertStore, test_clock};
//! use expert_booking_core::{ReservationService, SubscriptionRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryExpertStore::new());
//! let expert = fixtures::sample_expert();
//! store.insert_expert(expert.clone());
//!
//! let service = ReservationService::new(
//!     store,
//!     Arc::new(InMemoryBookingLedger::new()),
//!     Arc::new(SubscriptionRegistry::default()),
//!     Arc::new(test_clock()),
//! );
//!
//! let request = fixtures::reservation_for(&expert, 0);
//! let booking = service.create_reservation(request).await?;
//! assert_eq!(booking.expert_name, expert.name);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod store_mocks;

use chrono::{DateTime, Utc};
use expert_booking_core::environment::Clock;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Mutex;
    use std::sync::PoisonError;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use expert_booking_testing::mocks::FixedClock;
    /// use expert_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read.
    ///
    /// Gives each booking a distinct `created_at` so ordering assertions are exact.
    ///
    /// ```
    /// use expert_booking_testing::mocks::{SequenceClock, test_time};
    /// use expert_booking_core::environment::Clock;
    ///
    /// let clock = SequenceClock::starting_at(test_time());
    /// assert!(clock.now() < clock.now());
    /// ```
    #[derive(Debug)]
    pub struct SequenceClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SequenceClock {
        /// Start at `start`, advancing one second per read.
        #[must_use]
        pub fn starting_at(start: DateTime<Utc>) -> Self {
            Self::with_step(start, Duration::seconds(1))
        }

        /// Start at `start`, advancing `step` per read.
        #[must_use]
        pub const fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SequenceClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// The instant every test clock starts from (2025-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Phone numbers the contact validator accepts.
    pub fn valid_phone() -> impl Strategy<Value = String> {
        "\\+?[0-9]{3}[0-9 ()-]{3,10}[0-9]"
    }

    /// Lowercase email addresses the contact validator accepts.
    pub fn valid_email() -> impl Strategy<Value = String> {
        ("[a-z0-9]{1,12}", "[a-z]{2,10}", prop_oneof!["com", "org", "io"])
            .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
    }

    /// Strings that are not emails (no `@`).
    pub fn invalid_email() -> impl Strategy<Value = String> {
        "[a-z0-9.]{0,20}"
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Log output collected by [`capture_logs`].
#[derive(Clone, Debug, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Everything logged so far.
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Whether any logged line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Record every event at `DEBUG` and above on the current thread.
///
/// Events are captured until the returned guard is dropped. Use with the
/// default single-threaded `#[tokio::test]` runtime so spawned work stays on
/// this thread.
///
/// # Example
///
/// ```
/// let (logs, _guard) = expert_booking_testing::capture_logs();
/// tracing::warn!(expert_id = "e-1", "Slot lost");
/// assert!(logs.contains("Slot lost"));
/// ```
#[must_use]
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let logs = LogCapture::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequenceClock, test_clock, test_time};
pub use store_mocks::{InMemoryBookingLedger, InMemoryExpertStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_sequence_clock_advances() {
        let clock = SequenceClock::starting_at(test_time());
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, chrono::Duration::seconds(1));
    }
}
