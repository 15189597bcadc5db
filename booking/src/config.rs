//! Configuration for the booking collaborators.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Endpoints, timeouts and log level for the booking workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Catalog service base URL
    pub catalog_url: String,
    /// Booking service base URL
    pub booking_url: String,
    /// Payment service base URL
    pub payment_url: String,
    /// Bound on a catalog lookup
    pub catalog_timeout: Duration,
    /// Bound on a booking submission
    pub submission_timeout: Duration,
    /// Bound on a payment, from initiation to provider callback
    pub payment_timeout: Duration,
    /// Default tracing filter (e.g. "info", "waypoint_booking=debug")
    pub log_level: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            catalog_url: "http://localhost:8081".to_string(),
            booking_url: "http://localhost:8082".to_string(),
            payment_url: "http://localhost:8083".to_string(),
            catalog_timeout: Duration::from_secs(10),
            submission_timeout: Duration::from_secs(30),
            payment_timeout: Duration::from_secs(300),
            log_level: "info".to_string(),
        }
    }
}

impl BookingConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to [`BookingConfig::default`].
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            catalog_url: env::var("WAYPOINT_CATALOG_URL").unwrap_or(defaults.catalog_url),
            booking_url: env::var("WAYPOINT_BOOKING_URL").unwrap_or(defaults.booking_url),
            payment_url: env::var("WAYPOINT_PAYMENT_URL").unwrap_or(defaults.payment_url),
            catalog_timeout: env::var("WAYPOINT_CATALOG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.catalog_timeout, Duration::from_secs),
            submission_timeout: env::var("WAYPOINT_SUBMISSION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.submission_timeout, Duration::from_secs),
            payment_timeout: env::var("WAYPOINT_PAYMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.payment_timeout, Duration::from_secs),
            log_level: env::var("WAYPOINT_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// Override all three service URLs with one base (useful against a single mock server)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.catalog_url.clone_from(&base_url);
        self.booking_url.clone_from(&base_url);
        self.payment_url = base_url;
        self
    }

    /// Override the catalog timeout
    #[must_use]
    pub const fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    /// Override the submission timeout
    #[must_use]
    pub const fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }

    /// Override the payment timeout
    #[must_use]
    pub const fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }
}
