//! PostgreSQL-backed expert catalogue and slot store.

use crate::{slot_order, store_error};
use expert_booking_core::error::{ReserveError, StoreError, StoreResult};
use expert_booking_core::listing::{CategoryFilter, ExpertQuery, Page};
use expert_booking_core::store::{ExpertCatalog, SlotStore};
use expert_booking_core::types::{Category, Expert, ExpertId, ExpertSummary, Slot};
use sqlx::PgPool;
use uuid::Uuid;

const EXPERT_COLUMNS: &str =
    "e.id, e.name, e.category, e.experience_years, e.rating, e.bio, e.avatar, e.specializations";

#[derive(sqlx::FromRow)]
struct ExpertRow {
    id: Uuid,
    name: String,
    category: String,
    experience_years: i32,
    rating: f64,
    bio: String,
    avatar: String,
    specializations: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    expert: ExpertRow,
    available_slots_count: i64,
}

fn parse_category(raw: &str) -> StoreResult<Category> {
    raw.parse()
        .map_err(|e: String| StoreError::Corrupt(format!("experts.category: {e}")))
}

impl ExpertRow {
    fn into_expert(self, available_slots: Vec<Slot>) -> StoreResult<Expert> {
        Ok(Expert {
            id: ExpertId::from_uuid(self.id),
            category: parse_category(&self.category)?,
            name: self.name,
            experience: u32::try_from(self.experience_years).map_err(|_| {
                StoreError::Corrupt(format!(
                    "experts.experience_years out of range: {}",
                    self.experience_years
                ))
            })?,
            rating: self.rating,
            bio: self.bio,
            avatar: self.avatar,
            specializations: self.specializations,
            available_slots,
        })
    }
}

impl SummaryRow {
    fn into_summary(self) -> StoreResult<ExpertSummary> {
        let count = usize::try_from(self.available_slots_count).unwrap_or(0);
        let expert = self.expert.into_expert(Vec::new())?;
        Ok(ExpertSummary {
            available_slots_count: count,
            ..expert.summary()
        })
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL expert store.
///
/// # Example
///
/// ```no_run
/// use expert_booking_core::{ExpertId, SlotStore};
/// use expert_booking_postgres::PostgresExpertStore;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = PostgresExpertStore::new(pool);
/// let reserved = store.reserve_if_free(ExpertId::new(), "2026-03-02", "10:00 AM").await?;
/// assert!(reserved.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresExpertStore {
    pool: PgPool,
}

impl PostgresExpertStore {
    /// Create a store on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert an expert and its slots in one transaction.
    ///
    /// # Errors
    ///
    /// Returns error if any insert fails; nothing is written in that case.
    pub async fn insert_expert(&self, expert: &Expert) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", &e))?;

        sqlx::query(
            r"
            INSERT INTO experts (id, name, category, experience_years, rating, bio, avatar, specializations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(expert.id.as_uuid())
        .bind(&expert.name)
        .bind(expert.category.as_str())
        .bind(i32::try_from(expert.experience).unwrap_or(i32::MAX))
        .bind(expert.rating)
        .bind(&expert.bio)
        .bind(&expert.avatar)
        .bind(&expert.specializations)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("Failed to insert expert", &e))?;

        for slot in &expert.available_slots {
            sqlx::query(
                r"
                INSERT INTO expert_slots (expert_id, slot_date, slot_time, slot_order, is_booked)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(expert.id.as_uuid())
            .bind(&slot.date)
            .bind(&slot.time)
            .bind(slot_order(&slot.time))
            .bind(slot.is_booked)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to insert slot", &e))?;
        }

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit expert", &e))?;
        Ok(())
    }

    async fn load_slots(&self, expert_id: ExpertId) -> StoreResult<Vec<Slot>> {
        let rows: Vec<(String, String, bool)> = sqlx::query_as(
            r"
            SELECT slot_date, slot_time, is_booked
            FROM expert_slots
            WHERE expert_id = $1
            ORDER BY slot_date, slot_order, slot_time
            ",
        )
        .bind(expert_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to load slots", &e))?;

        Ok(rows
            .into_iter()
            .map(|(date, time, is_booked)| Slot {
                date,
                time,
                is_booked,
            })
            .collect())
    }

    async fn load_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        let row: Option<ExpertRow> =
            sqlx::query_as(&format!("SELECT {EXPERT_COLUMNS} FROM experts e WHERE e.id = $1"))
                .bind(expert_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_error("Failed to load expert", &e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let slots = self.load_slots(expert_id).await?;
        row.into_expert(slots).map(Some)
    }
}

impl SlotStore for PostgresExpertStore {
    #[tracing::instrument(skip(self), fields(expert_id = %expert_id))]
    async fn reserve_if_free(
        &self,
        expert_id: ExpertId,
        date: &str,
        time: &str,
    ) -> Result<Option<Expert>, ReserveError> {
        // The free flag is part of the predicate: concurrent callers serialise on
        // the row lock and every loser re-evaluates is_booked = FALSE as false.
        let flipped: Option<(i64,)> = sqlx::query_as(
            r"
            UPDATE expert_slots
            SET is_booked = TRUE, booked_at = NOW()
            WHERE expert_id = $1 AND slot_date = $2 AND slot_time = $3 AND is_booked = FALSE
            RETURNING id
            ",
        )
        .bind(expert_id.as_uuid())
        .bind(date)
        .bind(time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to reserve slot", &e))?;

        if flipped.is_none() {
            tracing::debug!("No free slot matched");
            return Ok(None);
        }

        // The flip is committed from here on; a failed read leaves the slot booked
        self.load_expert(expert_id)
            .await
            .map_err(ReserveError::Reload)
    }

    async fn find_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        self.load_expert(expert_id).await
    }
}

impl ExpertCatalog for PostgresExpertStore {
    async fn list_experts(&self, query: &ExpertQuery) -> StoreResult<Page<ExpertSummary>> {
        let search = query.search.as_deref().map(like_pattern);
        let category = match &query.category {
            CategoryFilter::Any => None,
            CategoryFilter::Only(category) => Some(category.as_str().to_string()),
            CategoryFilter::Unknown(_) => return Ok(Page::new(Vec::new(), query, 0)),
        };

        let (total,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM experts e
            WHERE ($1::TEXT IS NULL OR e.name ILIKE $1)
              AND ($2::TEXT IS NULL OR e.category = $2)
            ",
        )
        .bind(search.as_deref())
        .bind(category.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to count experts", &e))?;

        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            r"
            SELECT {EXPERT_COLUMNS},
                   COUNT(s.id) FILTER (WHERE s.is_booked = FALSE) AS available_slots_count
            FROM experts e
            LEFT JOIN expert_slots s ON s.expert_id = e.id
            WHERE ($1::TEXT IS NULL OR e.name ILIKE $1)
              AND ($2::TEXT IS NULL OR e.category = $2)
            GROUP BY e.id
            ORDER BY e.rating DESC, e.name ASC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(search.as_deref())
        .bind(category.as_deref())
        .bind(i64::from(query.limit))
        .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to list experts", &e))?;

        let items = rows
            .into_iter()
            .map(SummaryRow::into_summary)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page::new(items, query, u64::try_from(total).unwrap_or(0)))
    }

    async fn get_expert(&self, expert_id: ExpertId) -> StoreResult<Option<Expert>> {
        self.load_expert(expert_id).await
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT category FROM experts ORDER BY category")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_error("Failed to list categories", &e))?;

        rows.into_iter().map(|(raw,)| parse_category(&raw)).collect()
    }
}
