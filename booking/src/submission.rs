//! Booking submission client.
//!
//! Turns a frozen [`DraftSnapshot`] into a single creation request and
//! classifies the answer: a receipt, a structured rejection, or a transport
//! failure.

use crate::config::BookingConfig;
use crate::error::FieldError;
use crate::session::Identity;
use crate::types::{
    BookingNumber, BookingStatus, Contact, DraftSnapshot, LineItem, Load, PricingBreakdown, ScheduleSelection,
    ServiceId, ServiceKind,
};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Why a submission did not produce a booking
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// The booking service refused the request on business grounds
    #[error("booking rejected ({} field errors)", .errors.len())]
    Rejected {
        /// Offending fields
        errors: Vec<FieldError>,
    },

    /// The booking service did not accept the caller's token
    #[error("booking service rejected the access token")]
    Unauthenticated,

    /// Network failure, timeout or unexpected response
    #[error("booking request failed: {reason}")]
    Transport {
        /// Underlying reason
        reason: String,
    },
}

/// Confirmation returned by the booking service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Issued booking number
    pub booking_number: BookingNumber,
    /// Initial status, normally `created`
    pub status: BookingStatus,
}

/// Creates bookings from frozen drafts
pub trait SubmissionClient: Send + Sync {
    /// Submit a snapshot on behalf of `identity`.
    ///
    /// Each successful call creates exactly one booking; callers must not
    /// resubmit the same snapshot without an explicit user action.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionFailure`] on rejection, bad credentials or transport failure.
    fn submit(
        &self,
        snapshot: DraftSnapshot,
        identity: Identity,
    ) -> BoxFuture<'static, Result<SubmissionReceipt, SubmissionFailure>>;
}

// ============================================================================
// Wire format
// ============================================================================

/// Body of `POST /bookings`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Service booked
    pub service_id: ServiceId,
    /// Service kind
    pub kind: ServiceKind,
    /// Schedule selection
    pub schedule: ScheduleSelection,
    /// Roster, for seat and tour kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster: Option<Vec<LineItem>>,
    /// Quantity, for cargo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Contact
    pub contact: Contact,
    /// Approved pricing
    pub pricing: PricingBreakdown,
    /// Notes
    pub notes: String,
}

impl From<&DraftSnapshot> for CreateBookingRequest {
    fn from(snapshot: &DraftSnapshot) -> Self {
        let (roster, quantity) = match snapshot.load() {
            Load::Roster(items) => (Some(items.clone()), None),
            Load::Quantity(quantity) => (None, Some(*quantity)),
        };

        Self {
            service_id: snapshot.service_id().clone(),
            kind: snapshot.kind(),
            schedule: snapshot.schedule().clone(),
            roster,
            quantity,
            contact: snapshot.contact().clone(),
            pricing: snapshot.pricing().clone(),
            notes: snapshot.notes().to_string(),
        }
    }
}

/// Rejection body: either a bare list or `{ "errors": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RejectionBody {
    List(Vec<FieldError>),
    Wrapped { errors: Vec<FieldError> },
}

impl RejectionBody {
    fn into_errors(self) -> Vec<FieldError> {
        match self {
            Self::List(errors) | Self::Wrapped { errors } => errors,
        }
    }
}

// ============================================================================
// HTTP client
// ============================================================================

/// Submission client over HTTP: `POST {base_url}/bookings`
#[derive(Clone)]
pub struct HttpSubmissionClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSubmissionClient {
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
        Self::new(config.booking_url.clone(), config.submission_timeout)
    }
}

impl SubmissionClient for HttpSubmissionClient {
    fn submit(
        &self,
        snapshot: DraftSnapshot,
        identity: Identity,
    ) -> BoxFuture<'static, Result<SubmissionReceipt, SubmissionFailure>> {
        let body = CreateBookingRequest::from(&snapshot);
        let request = self
            .client
            .post(format!("{}/bookings", self.base_url))
            .bearer_auth(&identity.access_token)
            .timeout(self.timeout)
            .json(&body);

        Box::pin(async move {
            let response = request.send().await.map_err(|e| SubmissionFailure::Transport {
                reason: e.to_string(),
            })?;

            match response.status() {
                status if status.is_success() => {
                    let receipt: SubmissionReceipt =
                        response.json().await.map_err(|e| SubmissionFailure::Transport {
                            reason: format!("invalid booking response: {e}"),
                        })?;
                    tracing::info!(
                        service_id = %body.service_id,
                        booking_number = %receipt.booking_number,
                        status = %receipt.status,
                        "Booking created"
                    );
                    Ok(receipt)
                },
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    tracing::warn!(service_id = %body.service_id, "Booking service refused credentials");
                    Err(SubmissionFailure::Unauthenticated)
                },
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                    let status = response.status().as_u16();
                    let errors = response
                        .json::<RejectionBody>()
                        .await
                        .map(RejectionBody::into_errors)
                        .unwrap_or_else(|_| vec![FieldError::new("booking", "rejected by booking service")]);
                    tracing::warn!(
                        service_id = %body.service_id,
                        status,
                        errors = errors.len(),
                        "Booking rejected"
                    );
                    Err(SubmissionFailure::Rejected { errors })
                },
                status => {
                    tracing::warn!(service_id = %body.service_id, status = status.as_u16(), "Booking request failed");
                    Err(SubmissionFailure::Transport {
                        reason: format!("booking service returned status {}", status.as_u16()),
                    })
                },
            }
        })
    }
}
