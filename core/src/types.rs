//! Domain types for the expert booking marketplace.
//!
//! Experts own an ordered list of bookable slots. A successful reservation flips
//! exactly one slot from free to booked and produces one [`Booking`] in the ledger.
//! Serialized field names are camelCase because browsers are the main consumers.

use crate::error::BookingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an expert
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpertId(Uuid);

impl ExpertId {
    /// Creates a new random `ExpertId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ExpertId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExpertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpertId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Identifier of a live real-time connection.
///
/// Allocated by the [`SubscriptionRegistry`](crate::registry::SubscriptionRegistry);
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a `ConnectionId` from its raw value
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ============================================================================
// Experts and slots
// ============================================================================

/// Expert category (fixed enumeration)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Software, data and infrastructure
    Technology,
    /// Strategy, finance and growth
    Business,
    /// Medicine and wellness
    Health,
    /// Product, visual and interaction design
    Design,
    /// Teaching and learning
    Education,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Technology,
        Self::Business,
        Self::Health,
        Self::Design,
        Self::Education,
    ];

    /// Convert category to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Business => "Business",
            Self::Health => "Health",
            Self::Design => "Design",
            Self::Education => "Education",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

/// A bookable (date, time) unit belonging to one expert.
///
/// The (expert, date, time) triple is the unique key protected by the
/// no-double-booking guarantee. `is_booked` only ever goes from `false` to `true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Calendar date label (e.g. `2026-03-01`)
    pub date: String,
    /// Time label (e.g. `10:00 AM`)
    pub time: String,
    /// Whether the slot has been reserved
    pub is_booked: bool,
}

impl Slot {
    /// Create a free slot.
    #[must_use]
    pub fn free(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            is_booked: false,
        }
    }

    /// Whether this slot has the given (date, time) key.
    #[must_use]
    pub fn matches(&self, date: &str, time: &str) -> bool {
        self.date == date && self.time == time
    }
}

/// An expert with the full slot list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    /// Expert ID
    pub id: ExpertId,
    /// Display name
    pub name: String,
    /// Category
    pub category: Category,
    /// Years of experience
    pub experience: u32,
    /// Rating between 0 and 5
    pub rating: f64,
    /// Free-text biography
    pub bio: String,
    /// Avatar reference (emoji or URL)
    pub avatar: String,
    /// Specialization tags
    pub specializations: Vec<String>,
    /// Slots ordered by (date, time)
    pub available_slots: Vec<Slot>,
}

impl Expert {
    /// Number of slots that are still free.
    #[must_use]
    pub fn free_slot_count(&self) -> usize {
        self.available_slots.iter().filter(|s| !s.is_booked).count()
    }

    /// Find the slot with the given (date, time) key.
    #[must_use]
    pub fn slot(&self, date: &str, time: &str) -> Option<&Slot> {
        self.available_slots.iter().find(|s| s.matches(date, time))
    }

    /// Listing projection: everything except the slot array, which collapses to a count.
    #[must_use]
    pub fn summary(&self) -> ExpertSummary {
        ExpertSummary {
            id: self.id,
            name: self.name.clone(),
            category: self.category,
            experience: self.experience,
            rating: self.rating,
            bio: self.bio.clone(),
            avatar: self.avatar.clone(),
            specializations: self.specializations.clone(),
            available_slots_count: self.free_slot_count(),
        }
    }
}

/// Expert as shown in paginated listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertSummary {
    /// Expert ID
    pub id: ExpertId,
    /// Display name
    pub name: String,
    /// Category
    pub category: Category,
    /// Years of experience
    pub experience: u32,
    /// Rating between 0 and 5
    pub rating: f64,
    /// Free-text biography
    pub bio: String,
    /// Avatar reference
    pub avatar: String,
    /// Specialization tags
    pub specializations: Vec<String>,
    /// Number of free slots
    pub available_slots_count: usize,
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting confirmation
    Pending,
    /// Confirmed by an operator
    Confirmed,
    /// Session took place
    Completed,
}

impl BookingStatus {
    /// Convert status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            other => Err(BookingError::InvalidStatus(other.to_string())),
        }
    }
}

/// A confirmed reservation record.
///
/// `expert_name` is frozen at creation time so later edits to the expert do not
/// rewrite history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Reserved expert
    pub expert_id: ExpertId,
    /// Expert name at booking time
    pub expert_name: String,
    /// Contact name
    pub user_name: String,
    /// Contact email (trimmed, lowercase)
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Reserved date
    pub date: String,
    /// Reserved time
    pub time_slot: String,
    /// Free-text notes (empty when absent)
    pub notes: String,
    /// Current status
    pub status: BookingStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Public projection broadcast to other viewers (no email, no phone).
    #[must_use]
    pub fn public_view(&self) -> BookingSummary {
        BookingSummary {
            id: self.id,
            user_name: self.user_name.clone(),
            date: self.date.clone(),
            time_slot: self.time_slot.clone(),
            status: self.status,
        }
    }
}

/// Public projection of a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    /// Booking ID
    pub id: BookingId,
    /// Contact name
    pub user_name: String,
    /// Reserved date
    pub date: String,
    /// Reserved time
    pub time_slot: String,
    /// Current status
    pub status: BookingStatus,
}

/// Event fanned out to every connection watching an expert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBooked {
    /// Expert whose slot was taken
    pub expert_id: ExpertId,
    /// Slot date
    pub date: String,
    /// Slot time
    pub time_slot: String,
    /// Public projection of the new booking
    pub booking: BookingSummary,
}

/// Raw reservation input as submitted by a client.
///
/// Every field defaults to empty so that missing fields surface as validation
/// errors instead of deserialization failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationRequest {
    /// Expert to book
    pub expert_id: String,
    /// Contact name
    pub user_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Slot date
    pub date: String,
    /// Slot time
    pub time_slot: String,
    /// Optional notes
    pub notes: Option<String>,
}
