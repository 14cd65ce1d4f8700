//! Process wiring for the expert booking marketplace.
//!
//! - [`config`]: environment-driven configuration
//! - [`metrics`]: Prometheus exporter
//! - [`connect_pool`] / [`build_app`]: pool, stores, registry and router

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod metrics;

pub use config::Config;

use axum::Router;
use config::PostgresConfig;
use expert_booking_core::{ListingLimits, SubscriptionRegistry, SystemClock};
use expert_booking_postgres::{PostgresBookingLedger, PostgresExpertStore};
use expert_booking_web::{AppState, RouterConfig, build_router};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

/// Open the connection pool described by `config`.
///
/// # Errors
///
/// Returns error if no connection can be established within the connect timeout.
pub async fn connect_pool(config: &PostgresConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .connect(&config.url)
        .await
}

/// A ready-to-serve router and the registry behind its real-time channel.
pub struct App {
    /// HTTP and WebSocket routes
    pub router: Router,
    /// Registry to shut down when the process stops
    pub registry: Arc<SubscriptionRegistry>,
}

/// Wire the PostgreSQL stores, the registry and the router.
#[must_use]
pub fn build_app(config: &Config, pool: PgPool) -> App {
    let experts = Arc::new(PostgresExpertStore::new(pool.clone()));
    let ledger = Arc::new(PostgresBookingLedger::new(pool));
    let registry = Arc::new(SubscriptionRegistry::new(config.realtime.channel_capacity));

    let state = AppState::new(experts, ledger, Arc::clone(&registry), Arc::new(SystemClock))
        .with_listing_limits(ListingLimits {
            default_limit: config.listing.default_limit,
            max_limit: config.listing.max_limit,
        })
        .with_max_connections(config.realtime.max_connections);

    let router = build_router(
        state,
        &RouterConfig {
            allowed_origins: config.allowed_origins(),
            request_timeout: config.request_timeout(),
        },
    );

    App { router, registry }
}
