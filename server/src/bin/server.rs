//! Expert booking HTTP server.
//!
//! This binary:
//! - Connects to `PostgreSQL` and applies migrations
//! - Optionally reloads the sample catalogue (`SEED_ON_START=true`)
//! - Serves the REST API and the `/api/ws` real-time channel
//! - Exposes Prometheus metrics on `METRICS_HOST:METRICS_PORT`
//!
//! # Usage
//!
//! ```bash
//! docker compose up -d postgres
//! cargo run --bin server
//! ```

use expert_booking_postgres::{PostgresExpertStore, migrate, seed};
use expert_booking_server::{App, Config, build_app, connect_pool, metrics::MetricsServer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,expert_booking=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting expert booking server");

    // Load configuration
    let config = Config::from_env();
    info!(
        address = %config.server_address(),
        log_level = %config.server.log_level,
        allowed_origins = ?config.allowed_origins(),
        "Configuration loaded"
    );

    let mut metrics_server = MetricsServer::new(config.metrics_address().parse()?);
    metrics_server.start()?;

    info!("Connecting to database...");
    let pool = connect_pool(&config.postgres).await?;
    if config.postgres.run_migrations {
        migrate(&pool).await?;
    }

    if config.seed.on_start {
        let store = PostgresExpertStore::new(pool.clone());
        let mut rng = StdRng::from_entropy();
        let today = chrono::Utc::now().date_naive();
        seed::seed_catalogue(&store, today, config.seed.days, &mut rng).await?;
    }

    let App { router, registry } = build_app(&config, pool);

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    info!(address = %config.server_address(), "Server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server => {
            result??;
            return Ok(());
        }
    }

    // Real-time connections never finish on their own; closing their queues ends them
    registry.shutdown();
    let _ = stop_tx.send(());

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(result) => result??,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout,
            "Graceful shutdown timed out, dropping remaining connections"
        ),
    }

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
