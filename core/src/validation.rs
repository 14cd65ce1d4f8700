//! Field validation for reservation requests.
//!
//! Every field is checked independently and all violations are collected, so a
//! client fixing a form sees every problem at once rather than one per round trip.

use crate::error::FieldError;
use crate::types::{ExpertId, ReservationRequest};

/// Minimum phone length (characters).
pub const PHONE_MIN_LEN: usize = 7;

/// Maximum phone length (characters).
pub const PHONE_MAX_LEN: usize = 15;

/// A reservation request that passed validation, with normalized fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedReservation {
    /// Parsed expert ID
    pub expert_id: ExpertId,
    /// Trimmed contact name
    pub user_name: String,
    /// Trimmed, lowercase email
    pub email: String,
    /// Trimmed phone
    pub phone: String,
    /// Slot date
    pub date: String,
    /// Slot time
    pub time_slot: String,
    /// Trimmed notes, empty when absent
    pub notes: String,
}

/// Normalize an email for storage and lookup (trim + lowercase).
///
/// # Examples
///
/// ```
/// use expert_booking_core::validation::normalize_email;
///
/// assert_eq!(normalize_email(" Foo@Bar.com "), "foo@bar.com");
/// ```
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Domain must contain a dot and no empty labels
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use expert_booking_core::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';
    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}

/// Validate a phone number: 7 to 15 characters of digits, `+`, `-`, spaces and parentheses.
///
/// # Examples
///
/// ```
/// use expert_booking_core::validation::is_valid_phone;
///
/// assert!(is_valid_phone("+1 (555) 123-4567"));
/// assert!(!is_valid_phone("12345"));
/// assert!(!is_valid_phone("555-CALL-NOW"));
/// ```
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let len = phone.chars().count();
    (PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

/// Validate a raw reservation request.
///
/// # Errors
///
/// Returns one [`FieldError`] per offending field (at most one per field),
/// in form order: `expertId`, `userName`, `email`, `phone`, `date`, `timeSlot`.
pub fn validate_reservation(
    request: &ReservationRequest,
) -> Result<ValidatedReservation, Vec<FieldError>> {
    let mut errors = Vec::new();

    let expert_id = if request.expert_id.trim().is_empty() {
        errors.push(FieldError::new("expertId", "Expert ID is required"));
        None
    } else {
        match request.expert_id.parse::<ExpertId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("expertId", "Invalid expert ID format"));
                None
            }
        }
    };

    let user_name = request.user_name.trim();
    if user_name.is_empty() {
        errors.push(FieldError::new("userName", "Name is required"));
    }

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Valid email is required"));
    }

    let phone = request.phone.trim();
    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if !is_valid_phone(phone) {
        errors.push(FieldError::new("phone", "Invalid phone number format"));
    }

    let date = request.date.trim();
    if date.is_empty() {
        errors.push(FieldError::new("date", "Date is required"));
    }

    let time_slot = request.time_slot.trim();
    if time_slot.is_empty() {
        errors.push(FieldError::new("timeSlot", "Time slot is required"));
    }

    match expert_id {
        Some(expert_id) if errors.is_empty() => Ok(ValidatedReservation {
            expert_id,
            user_name: user_name.to_string(),
            email,
            phone: phone.to_string(),
            date: date.to_string(),
            time_slot: time_slot.to_string(),
            notes: request
                .notes
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Err(errors),
    }
}
