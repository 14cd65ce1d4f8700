//! Reload the sample expert catalogue.
//!
//! Wipes experts, slots and bookings, then inserts the sample experts with
//! `SEED_DAYS` days of slots starting today.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seed
//! ```

use expert_booking_postgres::{PostgresExpertStore, migrate, seed};
use expert_booking_server::{Config, connect_pool};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let pool = connect_pool(&config.postgres).await?;
    migrate(&pool).await?;

    let store = PostgresExpertStore::new(pool);
    let mut rng = StdRng::from_entropy();
    let today = chrono::Utc::now().date_naive();
    let inserted = seed::seed_catalogue(&store, today, config.seed.days, &mut rng).await?;

    tracing::info!(experts = inserted, days = config.seed.days, "Seeding complete");
    Ok(())
}
