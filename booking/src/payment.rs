//! Payment dispatcher.
//!
//! Two-phase protocol against an external provider:
//!
//! 1. [`PaymentDispatcher::initiate`] opens a [`PaymentIntent`] for the
//!    record's approved total under a fresh correlation token and returns the
//!    request to send to the provider.
//! 2. [`PaymentDispatcher::reconcile`] applies the provider's asynchronous
//!    outcome, keyed by that token. It applies once; repeats are no-ops.
//!
//! The dispatcher owns the intent and only reads the record's total.

use crate::config::BookingConfig;
use crate::error::BookingError;
use crate::types::{
    BookingNumber, BookingRecord, BookingStatus, CorrelationToken, PaymentIntent, PaymentOutcome, ProviderOutcome,
};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Payment gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Payment gateway error
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GatewayError {
    /// Provider refused to start the payment
    #[error("payment declined: {reason}")]
    Declined {
        /// Decline reason
        reason: String,
    },
    /// Gateway did not answer in time
    #[error("payment gateway timeout")]
    Timeout,
    /// Network failure or unexpected response
    #[error("payment gateway error: {reason}")]
    Transport {
        /// Underlying reason
        reason: String,
    },
}

/// Body of `POST /payments`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Booking being paid
    pub booking_number: BookingNumber,
    /// Amount to charge, the record's approved total
    pub amount: Decimal,
    /// Currency code
    pub currency: String,
    /// Selected provider
    pub provider_id: String,
    /// Token echoed back in the callback
    pub correlation_token: CorrelationToken,
}

/// Provider callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallback {
    /// Token from the initiating request
    pub correlation_token: CorrelationToken,
    /// Final outcome
    pub outcome: ProviderOutcome,
}

/// Payment gateway trait
///
/// Abstraction over payment providers. Initiation only hands the request to
/// the provider; the outcome arrives later as a [`PaymentCallback`].
pub trait PaymentGateway: Send + Sync {
    /// Start a payment
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be reached or refuses the request
    fn initiate(&self, request: PaymentRequest) -> BoxFuture<'static, GatewayResult<()>>;
}

/// Payment gateway over HTTP: `POST {base_url}/payments`
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPaymentGateway {
    /// Create a gateway for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create a gateway from configuration
    #[must_use]
    pub fn from_config(config: &BookingConfig) -> Self {
        Self::new(config.payment_url.clone(), config.payment_timeout)
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn initiate(&self, request: PaymentRequest) -> BoxFuture<'static, GatewayResult<()>> {
        let call = self
            .client
            .post(format!("{}/payments", self.base_url))
            .timeout(self.timeout)
            .json(&request);

        Box::pin(async move {
            let response = call.send().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport { reason: e.to_string() }
                }
            })?;

            match response.status() {
                status if status.is_success() => {
                    tracing::info!(
                        booking_number = %request.booking_number,
                        correlation_token = %request.correlation_token,
                        amount = %request.amount,
                        "Payment initiated"
                    );
                    Ok(())
                },
                StatusCode::PAYMENT_REQUIRED | StatusCode::UNPROCESSABLE_ENTITY => {
                    let reason = response.text().await.unwrap_or_default();
                    tracing::warn!(correlation_token = %request.correlation_token, %reason, "Payment declined");
                    Err(GatewayError::Declined { reason })
                },
                status => Err(GatewayError::Transport {
                    reason: format!("payment gateway returned status {}", status.as_u16()),
                }),
            }
        })
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Result of feeding an outcome to the dispatcher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The pending intent was resolved with this outcome
    Applied(PaymentOutcome),
    /// Same outcome as already recorded; nothing changed
    Duplicate,
    /// Token does not belong to the current intent; nothing changed
    Stale,
    /// Intent already resolved differently; nothing changed
    Conflict {
        /// Outcome already recorded
        recorded: PaymentOutcome,
        /// Outcome that was ignored
        ignored: PaymentOutcome,
    },
}

/// Owns the current payment intent of one booking
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentDispatcher {
    intent: Option<PaymentIntent>,
}

impl PaymentDispatcher {
    /// Dispatcher with no intent
    #[must_use]
    pub const fn new() -> Self {
        Self { intent: None }
    }

    /// Current intent, if any
    #[must_use]
    pub const fn intent(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    /// Whether an intent is waiting for the provider
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.intent
            .as_ref()
            .is_some_and(|intent| intent.outcome == PaymentOutcome::Pending)
    }

    /// Open a new intent for `record` and move it to `awaiting_payment`.
    ///
    /// Any previous (resolved) intent is discarded. The amount is the
    /// record's approved total, never recomputed.
    ///
    /// # Errors
    ///
    /// - [`BookingError::PaymentPending`] while another intent is pending
    /// - [`BookingError::InvalidTransition`] if the record is paid or cancelled
    pub fn initiate(
        &mut self,
        record: &mut BookingRecord,
        provider_id: String,
        correlation_token: CorrelationToken,
        now: DateTime<Utc>,
    ) -> Result<PaymentRequest, BookingError> {
        if self.has_pending() {
            return Err(BookingError::PaymentPending);
        }
        match record.status() {
            BookingStatus::Created | BookingStatus::PaymentFailed => {},
            BookingStatus::AwaitingPayment => return Err(BookingError::PaymentPending),
            status => {
                return Err(BookingError::InvalidTransition {
                    reason: format!("cannot pay a {status} booking"),
                });
            },
        }

        let intent = PaymentIntent {
            provider_id: provider_id.clone(),
            amount: record.total(),
            currency: record.currency().to_string(),
            correlation_token,
            outcome: PaymentOutcome::Pending,
            initiated_at: now,
        };
        let request = PaymentRequest {
            booking_number: record.booking_number().clone(),
            amount: intent.amount,
            currency: intent.currency.clone(),
            provider_id,
            correlation_token,
        };

        self.intent = Some(intent);
        record.set_status(BookingStatus::AwaitingPayment);
        Ok(request)
    }

    /// Apply a provider outcome keyed by correlation token.
    pub fn reconcile(
        &mut self,
        record: &mut BookingRecord,
        token: CorrelationToken,
        outcome: ProviderOutcome,
    ) -> Reconciliation {
        self.resolve(record, token, outcome.into())
    }

    /// Resolve the intent as failed: dispatch error or timeout.
    pub fn fail(&mut self, record: &mut BookingRecord, token: CorrelationToken) -> Reconciliation {
        self.resolve(record, token, PaymentOutcome::Failed)
    }

    /// Cancel the booking, discarding any pending intent.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] if the record is already paid or cancelled.
    pub fn cancel(&mut self, record: &mut BookingRecord) -> Result<(), BookingError> {
        if record.status().is_terminal() {
            return Err(BookingError::InvalidTransition {
                reason: format!("cannot cancel a {} booking", record.status()),
            });
        }
        self.intent = None;
        record.set_status(BookingStatus::Cancelled);
        Ok(())
    }

    fn resolve(
        &mut self,
        record: &mut BookingRecord,
        token: CorrelationToken,
        outcome: PaymentOutcome,
    ) -> Reconciliation {
        let Some(intent) = self.intent.as_mut().filter(|intent| intent.correlation_token == token) else {
            return Reconciliation::Stale;
        };

        match intent.outcome {
            PaymentOutcome::Pending => {
                intent.outcome = outcome;
                record.set_status(match outcome {
                    PaymentOutcome::Succeeded => BookingStatus::Paid,
                    PaymentOutcome::Failed | PaymentOutcome::Pending => BookingStatus::PaymentFailed,
                });
                Reconciliation::Applied(outcome)
            },
            recorded if recorded == outcome => Reconciliation::Duplicate,
            recorded => Reconciliation::Conflict {
                recorded,
                ignored: outcome,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::OfferingDto;
    use crate::types::{BookingDraft, DraftSnapshot, ServiceKind, ServiceOffering};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record() -> BookingRecord {
        let offering = ServiceOffering::try_from(
            OfferingDto::new("ktm-pkr", ServiceKind::SeatTransport, dec!(800), "NPR").with_tax("VAT", dec!(13)),
        )
        .unwrap();
        let draft = BookingDraft::seed(&offering);
        let snapshot = DraftSnapshot::freeze(&draft, &offering, Utc::now()).unwrap();
        BookingRecord::new(BookingNumber::new("WP-1001"), BookingStatus::Created, snapshot, Utc::now())
    }

    fn token(n: u128) -> CorrelationToken {
        CorrelationToken::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn initiate_uses_recorded_total() {
        let mut record = record();
        let mut dispatcher = PaymentDispatcher::new();

        let request = dispatcher
            .initiate(&mut record, "esewa".into(), token(1), Utc::now())
            .unwrap();

        assert_eq!(request.amount, dec!(904));
        assert_eq!(request.amount, record.total());
        assert_eq!(record.status(), BookingStatus::AwaitingPayment);
        assert!(dispatcher.has_pending());
    }

    #[test]
    fn second_initiate_while_pending_is_rejected() {
        let mut record = record();
        let mut dispatcher = PaymentDispatcher::new();
        dispatcher
            .initiate(&mut record, "esewa".into(), token(1), Utc::now())
            .unwrap();

        let result = dispatcher.initiate(&mut record, "khalti".into(), token(2), Utc::now());

        assert_eq!(result, Err(BookingError::PaymentPending));
        assert_eq!(dispatcher.intent().unwrap().correlation_token, token(1));
    }

    #[test]
    fn reconcile_applies_once() {
        let mut record = record();
        let mut dispatcher = PaymentDispatcher::new();
        dispatcher
            .initiate(&mut record, "esewa".into(), token(1), Utc::now())
            .unwrap();

        assert_eq!(
            dispatcher.reconcile(&mut record, token(1), ProviderOutcome::Succeeded),
            Reconciliation::Applied(PaymentOutcome::Succeeded)
        );
        assert_eq!(record.status(), BookingStatus::Paid);
        assert_eq!(
            dispatcher.reconcile(&mut record, token(1), ProviderOutcome::Succeeded),
            Reconciliation::Duplicate
        );
        assert_eq!(
            dispatcher.reconcile(&mut record, token(1), ProviderOutcome::Failed),
            Reconciliation::Conflict {
                recorded: PaymentOutcome::Succeeded,
                ignored: PaymentOutcome::Failed
            }
        );
        assert_eq!(record.status(), BookingStatus::Paid);
    }

    #[test]
    fn retry_after_failure_discards_old_intent() {
        let mut record = record();
        let mut dispatcher = PaymentDispatcher::new();
        dispatcher
            .initiate(&mut record, "esewa".into(), token(1), Utc::now())
            .unwrap();
        dispatcher.fail(&mut record, token(1));
        assert_eq!(record.status(), BookingStatus::PaymentFailed);

        dispatcher
            .initiate(&mut record, "esewa".into(), token(2), Utc::now())
            .unwrap();

        assert_eq!(
            dispatcher.reconcile(&mut record, token(1), ProviderOutcome::Succeeded),
            Reconciliation::Stale
        );
        assert_eq!(record.status(), BookingStatus::AwaitingPayment);
    }

    #[test]
    fn cancel_discards_pending_intent() {
        let mut record = record();
        let mut dispatcher = PaymentDispatcher::new();
        dispatcher
            .initiate(&mut record, "esewa".into(), token(1), Utc::now())
            .unwrap();

        dispatcher.cancel(&mut record).unwrap();

        assert_eq!(record.status(), BookingStatus::Cancelled);
        assert!(dispatcher.intent().is_none());
        assert_eq!(
            dispatcher.reconcile(&mut record, token(1), ProviderOutcome::Succeeded),
            Reconciliation::Stale
        );
        assert!(dispatcher.cancel(&mut record).is_err());
        assert!(dispatcher
            .initiate(&mut record, "esewa".into(), token(2), Utc::now())
            .is_err());
    }
}
