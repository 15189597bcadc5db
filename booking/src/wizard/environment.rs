//! Environment dependencies for the booking wizard.

use crate::catalog::CatalogClient;
use crate::config::BookingConfig;
use crate::payment::PaymentGateway;
use crate::submission::SubmissionClient;
use std::sync::Arc;
use waypoint_core::environment::{Clock, IdGenerator};

/// Injected collaborators
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of attempt ids and correlation tokens
    pub ids: Arc<dyn IdGenerator>,
    /// Offering lookup
    pub catalog: Arc<dyn CatalogClient>,
    /// Booking creation
    pub submissions: Arc<dyn SubmissionClient>,
    /// Payment provider
    pub payments: Arc<dyn PaymentGateway>,
    /// Timeouts
    pub config: BookingConfig,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment` with default configuration
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        catalog: Arc<dyn CatalogClient>,
        submissions: Arc<dyn SubmissionClient>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            clock,
            ids,
            catalog,
            submissions,
            payments,
            config: BookingConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: BookingConfig) -> Self {
        self.config = config;
        self
    }
}
