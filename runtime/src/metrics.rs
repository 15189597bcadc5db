//! Prometheus metrics for the store and the booking workflow.
//!
//! Metrics are recorded through the `metrics` facade everywhere in the
//! workspace; this module installs the Prometheus recorder and registers
//! descriptions so the rendered output is self-documenting.
//!
//! # Example
//!
//! ```rust,no_run
//! use waypoint_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... run the workflow ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions processed by the store
pub const STORE_COMMANDS_TOTAL: &str = "store.commands.total";
/// Effects executed by the store, labelled by `type`
pub const STORE_EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Reducer execution time
pub const STORE_REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Booking submission outcomes, labelled by `outcome`
pub const BOOKING_SUBMISSIONS: &str = "booking.submissions";
/// Payment dispatch outcomes, labelled by `outcome`
pub const BOOKING_PAYMENTS: &str = "booking.payments";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Installs a Prometheus recorder and renders its current snapshot.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not yet installed.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Install the Prometheus recorder as the global `metrics` recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed (common in tests) is treated as success.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder hasn't been installed by this instance.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(STORE_COMMANDS_TOTAL, "Total number of actions sent to stores");
    describe_counter!(STORE_EFFECTS_EXECUTED, "Total number of effects executed, by type");
    describe_histogram!(STORE_REDUCER_DURATION, "Time taken to execute reducers");
    describe_counter!(BOOKING_SUBMISSIONS, "Booking submission attempts, by outcome");
    describe_counter!(BOOKING_PAYMENTS, "Payment dispatches to the provider, by outcome");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninstalled_recorder_renders_nothing() {
        let recorder = MetricsRecorder::new();
        assert!(recorder.render().is_none());
    }
}
