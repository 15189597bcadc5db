//! Catalog lookup client.
//!
//! Fetches one service definition by identifier and normalises the wire DTO
//! into a fully populated [`ServiceOffering`].

use crate::config::BookingConfig;
use crate::error::OfferingError;
use crate::types::{ScheduleOptions, ServiceId, ServiceKind, ServiceOffering, TaxRule};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Roster limit when the catalog does not publish one
pub const DEFAULT_MAX_ROSTER_SIZE: usize = 6;

/// Catalog lookup errors
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// No listing with this identifier
    #[error("service {0} not found")]
    NotFound(ServiceId),

    /// Network failure
    #[error("catalog request failed: {0}")]
    Transport(String),

    /// Catalog answered with an unexpected status
    #[error("catalog returned status {status}")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// Body was not a valid offering document
    #[error("failed to decode offering: {0}")]
    Decode(String),

    /// Offering failed normalisation
    #[error("invalid offering: {0}")]
    InvalidOffering(#[from] OfferingError),
}

/// Source of service offerings
pub trait CatalogClient: Send + Sync {
    /// Fetch and normalise one offering
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the offering is missing, unreachable or invalid.
    fn fetch(&self, service_id: ServiceId) -> BoxFuture<'static, Result<ServiceOffering, CatalogError>>;
}

// ============================================================================
// Wire format
// ============================================================================

/// Tax rule as published by the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRuleDto {
    /// Tax name
    pub name: String,
    /// Rate as a percentage
    pub rate_percent: Decimal,
}

/// Schedule options as published by the catalog; absent lists mean "not applicable"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOptionsDto {
    /// Departure or pickup times
    #[serde(default)]
    pub time_slots: Vec<String>,
    /// Boarding points
    #[serde(default)]
    pub boarding_points: Vec<String>,
    /// Dropping points
    #[serde(default)]
    pub dropping_points: Vec<String>,
    /// Assignable seat or slot identifiers
    #[serde(default)]
    pub slots: Vec<String>,
}

/// Offering document returned by the catalog service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingDto {
    /// Identifier
    pub id: String,
    /// Service kind
    pub kind: ServiceKind,
    /// Price per unit
    pub base_price: Decimal,
    /// Currency code
    pub currency: String,
    /// Tax rules
    #[serde(default)]
    pub tax_rules: Option<Vec<TaxRuleDto>>,
    /// Schedule options
    #[serde(default)]
    pub schedule_options: Option<ScheduleOptionsDto>,
    /// Roster limit
    #[serde(default)]
    pub max_roster_size: Option<usize>,
    /// Urgency multiplier
    #[serde(default)]
    pub urgency_multiplier: Option<Decimal>,
}

impl OfferingDto {
    /// Minimal document with every optional field absent
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ServiceKind, base_price: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            base_price,
            currency: currency.into(),
            tax_rules: None,
            schedule_options: None,
            max_roster_size: None,
            urgency_multiplier: None,
        }
    }

    /// Add a tax rule
    #[must_use]
    pub fn with_tax(mut self, name: impl Into<String>, rate_percent: Decimal) -> Self {
        self.tax_rules.get_or_insert_with(Vec::new).push(TaxRuleDto {
            name: name.into(),
            rate_percent,
        });
        self
    }

    /// Set the schedule options
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleOptionsDto) -> Self {
        self.schedule_options = Some(schedule);
        self
    }

    /// Set the roster limit
    #[must_use]
    pub const fn with_max_roster_size(mut self, max: usize) -> Self {
        self.max_roster_size = Some(max);
        self
    }

    /// Set the urgency multiplier
    #[must_use]
    pub const fn with_urgency_multiplier(mut self, multiplier: Decimal) -> Self {
        self.urgency_multiplier = Some(multiplier);
        self
    }
}

impl TryFrom<OfferingDto> for ServiceOffering {
    type Error = OfferingError;

    fn try_from(dto: OfferingDto) -> Result<Self, Self::Error> {
        let max_roster_size = if dto.kind.has_roster() {
            dto.max_roster_size.unwrap_or(DEFAULT_MAX_ROSTER_SIZE)
        } else {
            1
        };
        let schedule = dto.schedule_options.unwrap_or_default();

        let offering = Self {
            id: ServiceId::new(dto.id),
            kind: dto.kind,
            base_price: dto.base_price,
            currency: dto.currency.trim().to_ascii_uppercase(),
            tax_rules: dto
                .tax_rules
                .unwrap_or_default()
                .into_iter()
                .map(|rule| TaxRule {
                    name: rule.name,
                    rate_percent: rule.rate_percent,
                })
                .collect(),
            schedule: ScheduleOptions {
                time_slots: schedule.time_slots,
                boarding_points: schedule.boarding_points,
                dropping_points: schedule.dropping_points,
                slots: schedule.slots,
            },
            max_roster_size,
            urgency_multiplier: dto.urgency_multiplier.unwrap_or_else(default_urgency_multiplier),
        };

        offering.validate()?;
        Ok(offering)
    }
}

/// 1.5, used when the catalog does not publish a multiplier
fn default_urgency_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

// ============================================================================
// HTTP client
// ============================================================================

/// Catalog client over HTTP: `GET {base_url}/services/{id}`
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalogClient {
    /// Create a client for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create a client from configuration
    #[must_use]
    pub fn from_config(config: &BookingConfig) -> Self {
        Self::new(config.catalog_url.clone(), config.catalog_timeout)
    }
}

impl CatalogClient for HttpCatalogClient {
    fn fetch(&self, service_id: ServiceId) -> BoxFuture<'static, Result<ServiceOffering, CatalogError>> {
        let request = self
            .client
            .get(format!("{}/services/{}", self.base_url, service_id))
            .timeout(self.timeout);

        Box::pin(async move {
            let response = request
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            match response.status() {
                status if status.is_success() => {
                    let dto: OfferingDto = response
                        .json()
                        .await
                        .map_err(|e| CatalogError::Decode(e.to_string()))?;
                    let offering = ServiceOffering::try_from(dto)?;
                    tracing::debug!(service_id = %service_id, kind = %offering.kind(), "Offering fetched");
                    Ok(offering)
                },
                StatusCode::NOT_FOUND => {
                    tracing::warn!(service_id = %service_id, "Offering not found");
                    Err(CatalogError::NotFound(service_id))
                },
                status => {
                    tracing::warn!(service_id = %service_id, status = status.as_u16(), "Catalog lookup failed");
                    Err(CatalogError::Server {
                        status: status.as_u16(),
                    })
                },
            }
        })
    }
}
