//! Prometheus exporter for the booking server.
//!
//! # Example
//!
//! ```rust,no_run
//! use expert_booking_server::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Metrics available at http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Installs the global recorder and serves `/metrics` on its own listener.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server bound to `addr` once started.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Install the recorder and spawn the HTTP exporter.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or a recorder is already installed.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(self.addr)
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .build()
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = recorder.handle();
        metrics::set_global_recorder(recorder)
            .map_err(|e| MetricsError::Install(e.to_string()))?;
        // Descriptions only reach the recorder installed at the time of the call
        register_metrics();

        tokio::spawn(async move {
            // `ExporterError` implements neither `Debug` nor `Display` in this version
            if let Err(_e) = exporter.await {
                tracing::error!("Metrics exporter stopped");
            }
        });

        tracing::info!(addr = %self.addr, "Metrics available at http://{}/metrics", self.addr);
        self.handle = Some(handle);
        Ok(())
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the server hasn't been started.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Reservation metrics
    describe_counter!(
        "bookings_created_total",
        "Total number of bookings recorded"
    );
    describe_counter!(
        "booking_conflicts_total",
        "Reservation attempts that lost the race for a slot"
    );
    describe_counter!(
        "booking_validation_failures_total",
        "Reservation requests rejected by validation"
    );
    describe_counter!(
        "booking_orphaned_slots_total",
        "Slots marked booked whose ledger write failed"
    );
    describe_histogram!(
        "reservation_duration_seconds",
        "Time taken to validate, reserve, record and publish a booking"
    );
    describe_counter!(
        "ledger_appends_total",
        "Bookings written to the PostgreSQL ledger"
    );

    // Real-time metrics
    describe_gauge!(
        "realtime_connections",
        "Currently open real-time connections"
    );
    describe_counter!(
        "realtime_connections_refused_total",
        "Real-time upgrades refused at the connection limit"
    );
    describe_counter!(
        "slot_events_published_total",
        "slotBooked events delivered to connection queues"
    );
    describe_counter!(
        "slot_events_dropped_total",
        "slotBooked events dropped because a queue was full or closed"
    );

    // HTTP metrics
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency by method and status"
    );
}
