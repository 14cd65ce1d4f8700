//! Sample experts and reservation requests.

use expert_booking_core::types::{Category, Expert, ExpertId, ReservationRequest, Slot};

/// Dates used by every fixture slot.
pub const FIXTURE_DATES: [&str; 2] = ["2026-03-02", "2026-03-03"];

/// Time labels used by every fixture slot.
pub const FIXTURE_TIMES: [&str; 4] = ["09:00 AM", "10:30 AM", "02:00 PM", "04:30 PM"];

/// Free slots for every fixture date and time, ordered by (date, time).
#[must_use]
pub fn free_slots() -> Vec<Slot> {
    FIXTURE_DATES
        .iter()
        .flat_map(|date| FIXTURE_TIMES.iter().map(move |time| Slot::free(*date, *time)))
        .collect()
}

/// Build an expert with the standard free slots.
#[must_use]
pub fn expert(name: &str, category: Category, rating: f64) -> Expert {
    Expert {
        id: ExpertId::new(),
        name: name.to_string(),
        category,
        experience: 10,
        rating,
        bio: format!("{name} has helped hundreds of clients."),
        avatar: "🧑‍💼".to_string(),
        specializations: vec![category.as_str().to_string()],
        available_slots: free_slots(),
    }
}

/// A single Technology expert with eight free slots.
#[must_use]
pub fn sample_expert() -> Expert {
    Expert {
        experience: 12,
        avatar: "👩‍💻".to_string(),
        specializations: vec![
            "Machine Learning".to_string(),
            "Deep Learning".to_string(),
            "Python".to_string(),
        ],
        ..expert("Dr. Sarah Chen", Category::Technology, 4.9)
    }
}

/// Eight experts spanning every category except Education.
#[must_use]
pub fn catalogue() -> Vec<Expert> {
    vec![
        sample_expert(),
        expert("James Rodriguez", Category::Business, 4.8),
        expert("Dr. Emily Watson", Category::Health, 4.7),
        expert("Alex Kim", Category::Design, 4.9),
        expert("Lisa Park", Category::Technology, 4.8),
        expert("David Martinez", Category::Business, 4.5),
        expert("Tom Anderson", Category::Design, 4.7),
        expert("Chris Yang", Category::Technology, 4.6),
    ]
}

/// A valid request for the `slot_index`-th slot of `expert`.
///
/// # Panics
///
/// Panics if the expert has no slot at `slot_index`.
#[must_use]
pub fn reservation_for(expert: &Expert, slot_index: usize) -> ReservationRequest {
    let slot = &expert.available_slots[slot_index];
    ReservationRequest {
        expert_id: expert.id.to_string(),
        user_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+1 555 010 2030".to_string(),
        date: slot.date.clone(),
        time_slot: slot.time.clone(),
        notes: Some("Looking forward to it".to_string()),
    }
}
