//! Relay metrics
//!
//! Counters and histograms recorded through the `metrics` facade. Nothing is
//! exported unless a recorder is installed, see [`init_metrics_exporter`].
//!
//! # Metrics
//!
//! - `tagwatch_webhooks_total`: Counter of webhook requests by outcome
//! - `tagwatch_delivery_duration_seconds`: Histogram of Gotify round-trip time
//!
//! # Examples
//!
//! ```
//! use tagwatch::metrics::DeliveryTimer;
//!
//! let timer = DeliveryTimer::start();
//! timer.finish("delivered");
//! ```

use metrics::{histogram, increment_counter};
use std::time::Instant;

/// Outcome label for requests ignored because the action was not a push.
pub const OUTCOME_NOT_PUSH: &str = "not_push";
/// Outcome label for pushes of images not on the watch-list.
pub const OUTCOME_UNWATCHED: &str = "unwatched";
/// Outcome label for notifications accepted by Gotify.
pub const OUTCOME_DELIVERED: &str = "delivered";
/// Outcome label for rejected or failed deliveries.
pub const OUTCOME_DELIVERY_FAILED: &str = "delivery_failed";
/// Outcome label for malformed payloads.
pub const OUTCOME_INVALID_PAYLOAD: &str = "invalid_payload";

/// Count one handled webhook request.
pub fn record_webhook(outcome: &'static str) {
    increment_counter!("tagwatch_webhooks_total", "outcome" => outcome);
}

/// Times a single delivery attempt.
#[derive(Debug)]
pub struct DeliveryTimer {
    start: Instant,
}

impl DeliveryTimer {
    /// Start timing a delivery.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record the elapsed time labelled with the delivery status.
    pub fn finish(self, status: &'static str) {
        histogram!(
            "tagwatch_delivery_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "status" => status
        );
    }
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this installs the Prometheus
/// exporter with its default listener. When disabled, it's a no-op.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
