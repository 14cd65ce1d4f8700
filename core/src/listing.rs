//! Expert listing query normalisation and pagination metadata.
//!
//! Raw query-string values arrive as untrusted strings. [`ExpertQuery::from_params`]
//! turns them into a bounded query every store interprets identically.

use crate::types::{Category, Expert};
use serde::{Deserialize, Serialize};

/// Raw listing parameters as received from a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingParams {
    /// Requested page (1-based)
    pub page: Option<String>,
    /// Requested page size
    pub limit: Option<String>,
    /// Case-insensitive name substring
    pub search: Option<String>,
    /// Exact category name
    pub category: Option<String>,
}

/// Page size bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingLimits {
    /// Page size used when none (or garbage) is supplied
    pub default_limit: u32,
    /// Upper bound on page size
    pub max_limit: u32,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            default_limit: 6,
            max_limit: 50,
        }
    }
}

/// Category filter after normalisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No filter
    Any,
    /// A known category
    Only(Category),
    /// A name that matches no category; always yields an empty page
    Unknown(String),
}

/// Normalised listing query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpertQuery {
    /// Page number, at least 1
    pub page: u32,
    /// Page size, in `[1, max_limit]`
    pub limit: u32,
    /// Trimmed, non-empty search term
    pub search: Option<String>,
    /// Category filter
    pub category: CategoryFilter,
}

impl ExpertQuery {
    /// Normalise raw parameters against the given limits.
    ///
    /// # Examples
    ///
    /// ```
    /// use expert_booking_core::{ExpertQuery, ListingLimits, ListingParams};
    ///
    /// let params = ListingParams {
    ///     page: Some("0".into()),
    ///     limit: Some("500".into()),
    ///     ..ListingParams::default()
    /// };
    /// let query = ExpertQuery::from_params(&params, ListingLimits::default());
    /// assert_eq!(query.page, 1);
    /// assert_eq!(query.limit, 50);
    /// ```
    #[must_use]
    pub fn from_params(params: &ListingParams, limits: ListingLimits) -> Self {
        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map_or(1, |p| p.clamp(1, i64::from(u32::MAX)));

        let max_limit = limits.max_limit.max(1);
        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(i64::from(limits.default_limit))
            .clamp(1, i64::from(max_limit));

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => CategoryFilter::Any,
            Some(name) => name
                .parse::<Category>()
                .map_or_else(|_| CategoryFilter::Unknown(name.to_string()), CategoryFilter::Only),
        };

        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: u32::try_from(limit).unwrap_or(max_limit),
            search,
            category,
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Whether an expert passes the search and category filters.
    #[must_use]
    pub fn matches(&self, expert: &Expert) -> bool {
        let category_ok = match &self.category {
            CategoryFilter::Any => true,
            CategoryFilter::Only(category) => expert.category == *category,
            CategoryFilter::Unknown(_) => false,
        };

        let search_ok = self.search.as_deref().is_none_or(|term| {
            expert
                .name
                .to_lowercase()
                .contains(&term.to_lowercase())
        });

        category_ok && search_ok
    }
}

impl Default for ExpertQuery {
    fn default() -> Self {
        Self::from_params(&ListingParams::default(), ListingLimits::default())
    }
}

/// Pagination metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based)
    pub current_page: u32,
    /// Total pages, `ceil(total / limit)`
    pub total_pages: u64,
    /// Total matching experts
    pub total_experts: u64,
    /// Whether a later page exists
    pub has_next_page: bool,
    /// Whether an earlier page exists
    pub has_prev_page: bool,
}

impl Pagination {
    /// Compute metadata for a page.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            current_page: page,
            total_pages,
            total_experts: total,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Build a page for a query from its items and total match count.
    #[must_use]
    pub fn new(items: Vec<T>, query: &ExpertQuery, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(query.page, query.limit, total),
        }
    }
}
