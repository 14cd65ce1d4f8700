//! PostgreSQL-backed booking ledger.

use crate::store_error;
use chrono::{DateTime, Utc};
use expert_booking_core::error::{StoreError, StoreResult};
use expert_booking_core::store::BookingLedger;
use expert_booking_core::types::{Booking, BookingId, BookingStatus, ExpertId};
use sqlx::PgPool;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, expert_id, expert_name, user_name, email, phone, \
     slot_date, slot_time, notes, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    expert_id: Uuid,
    expert_name: String,
    user_name: String,
    email: String,
    phone: String,
    slot_date: String,
    slot_time: String,
    notes: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("bookings.status: {}", row.status)))?;

        Ok(Self {
            id: BookingId::from_uuid(row.id),
            expert_id: ExpertId::from_uuid(row.expert_id),
            expert_name: row.expert_name,
            user_name: row.user_name,
            email: row.email,
            phone: row.phone,
            date: row.slot_date,
            time_slot: row.slot_time,
            notes: row.notes,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL booking ledger.
#[derive(Clone, Debug)]
pub struct PostgresBookingLedger {
    pool: PgPool,
}

impl PostgresBookingLedger {
    /// Create a ledger on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl BookingLedger for PostgresBookingLedger {
    async fn append(&self, booking: &Booking) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO bookings (
                id, expert_id, expert_name, user_name, email, phone,
                slot_date, slot_time, notes, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.expert_id.as_uuid())
        .bind(&booking.expert_name)
        .bind(&booking.user_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.date)
        .bind(&booking.time_slot)
        .bind(&booking.notes)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to append booking", &e))?;

        metrics::counter!("ledger_appends_total").increment(1);
        Ok(())
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id.as_uuid())
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to update booking status", &e))?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE email = $1 \
             ORDER BY created_at DESC, ledger_seq DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to query bookings", &e))?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}
