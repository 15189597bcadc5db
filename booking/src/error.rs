//! Error types for the booking core.
//!
//! [`BookingError`] is what the wizard records in its state; every variant
//! maps to exactly one [`ErrorSurface`] so callers know how to present it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One offending field, addressed by path (`contact.email`, `roster[1].name`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

impl FieldError {
    /// Create a field error
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// How an error should be presented to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorSurface {
    /// Inline message next to the offending field or control
    Inline,
    /// The page cannot be used until a retry succeeds
    PageBlocking,
    /// Dismissable notice offering a retry
    RetryableNotice,
    /// Payment notice: the booking exists but is unpaid
    PaymentNotice,
    /// Send the user to sign in
    Redirect,
}

/// Errors produced by the booking workflow
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BookingError {
    /// One or more fields failed validation
    #[error("validation failed: {}", join(.errors))]
    Validation {
        /// Offending fields
        errors: Vec<FieldError>,
    },

    /// The service offering could not be loaded
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable {
        /// Underlying reason
        reason: String,
    },

    /// The booking service rejected the submission
    #[error("submission rejected: {}", join(.errors))]
    SubmissionRejected {
        /// Fields the booking service objected to
        errors: Vec<FieldError>,
    },

    /// Network failure or timeout while submitting
    #[error("submission failed: {reason}")]
    SubmissionTransport {
        /// Underlying reason
        reason: String,
    },

    /// The provider declined, dispatch failed or the payment timed out
    #[error("payment failed: {reason}")]
    PaymentFailed {
        /// Underlying reason
        reason: String,
    },

    /// Roster size would leave the allowed range
    #[error("roster size {requested} outside {min}..={max}")]
    CapacityExceeded {
        /// Requested roster size
        requested: usize,
        /// Smallest allowed roster
        min: usize,
        /// Largest allowed roster
        max: usize,
    },

    /// No signed-in identity
    #[error("sign-in required")]
    Unauthenticated,

    /// The action is not allowed in the current step or status
    #[error("invalid transition: {reason}")]
    InvalidTransition {
        /// What was attempted and why it is not allowed
        reason: String,
    },

    /// A submission attempt is still outstanding
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// A payment intent is still pending
    #[error("a payment is already pending")]
    PaymentPending,

    /// The seat or slot is taken or not offered
    #[error("slot {slot} is not available")]
    SlotUnavailable {
        /// Requested slot
        slot: String,
    },

    /// The operation does not apply to this service kind
    #[error("{operation} does not apply to {kind} services")]
    NotApplicable {
        /// Attempted operation
        operation: String,
        /// Service kind
        kind: String,
    },
}

impl BookingError {
    /// Shorthand for a single-field validation error
    #[must_use]
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, reason)],
        }
    }

    /// How this error should be presented
    #[must_use]
    pub const fn surface(&self) -> ErrorSurface {
        match self {
            Self::Validation { .. }
            | Self::CapacityExceeded { .. }
            | Self::SlotUnavailable { .. }
            | Self::NotApplicable { .. }
            | Self::InvalidTransition { .. } => ErrorSurface::Inline,
            Self::CatalogUnavailable { .. } => ErrorSurface::PageBlocking,
            Self::SubmissionRejected { .. }
            | Self::SubmissionTransport { .. }
            | Self::SubmissionInFlight => ErrorSurface::RetryableNotice,
            Self::PaymentFailed { .. } | Self::PaymentPending => ErrorSurface::PaymentNotice,
            Self::Unauthenticated => ErrorSurface::Redirect,
        }
    }

    /// Whether the user can retry the failed operation
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CatalogUnavailable { .. } | Self::SubmissionTransport { .. } | Self::PaymentFailed { .. }
        )
    }

    /// Whether the workflow cannot continue without a retry
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.surface(), ErrorSurface::PageBlocking)
    }
}

/// Reasons a catalog DTO cannot be normalised into a `ServiceOffering`
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum OfferingError {
    /// Empty identifier
    #[error("offering has no identifier")]
    MissingId,

    /// Not a 3-letter uppercase currency code
    #[error("invalid currency code {0:?}")]
    InvalidCurrency(String),

    /// Base price below zero
    #[error("base price {0} is negative")]
    NegativeBasePrice(Decimal),

    /// Tax rate outside `0..=100`
    #[error("tax rate {rate} for {name} is outside 0..=100")]
    TaxRateOutOfRange {
        /// Tax name
        name: String,
        /// Offending rate
        rate: Decimal,
    },

    /// Roster limit of zero
    #[error("max roster size must be at least 1")]
    InvalidRosterSize,

    /// Urgency multiplier below 1
    #[error("urgency multiplier {0} is below 1")]
    InvalidUrgencyMultiplier(Decimal),

    /// Base price above the accepted ceiling
    #[error("base price {0} exceeds the accepted maximum")]
    BasePriceTooLarge(Decimal),
}

/// Inconsistencies detected while pricing
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PricingDataError {
    /// Discount exceeded the taxed subtotal; the total was floored at zero
    #[error("discount exceeds subtotal, total floored at 0 (was {unclamped})")]
    NegativeTotal {
        /// Total before flooring
        unclamped: Decimal,
    },

    /// An amount did not fit in a decimal; the breakdown was zeroed
    #[error("price calculation overflowed")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_inline_and_never_fatal() {
        let error = BookingError::field("contact.email", "not a valid email");

        assert_eq!(error.surface(), ErrorSurface::Inline);
        assert!(!error.is_fatal());
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "validation failed: contact.email: not a valid email");
    }

    #[test]
    fn capacity_is_inline() {
        let error = BookingError::CapacityExceeded {
            requested: 7,
            min: 1,
            max: 6,
        };
        assert_eq!(error.surface(), ErrorSurface::Inline);
        assert_eq!(error.to_string(), "roster size 7 outside 1..=6");
    }

    #[test]
    fn payment_failures_are_distinct_from_booking_failures() {
        let payment = BookingError::PaymentFailed {
            reason: "declined".to_string(),
        };
        let submission = BookingError::SubmissionTransport {
            reason: "connection reset".to_string(),
        };

        assert_eq!(payment.surface(), ErrorSurface::PaymentNotice);
        assert_eq!(submission.surface(), ErrorSurface::RetryableNotice);
        assert!(payment.is_retryable());
        assert!(submission.is_retryable());
    }

    #[test]
    fn only_catalog_failure_blocks_the_page() {
        let catalog = BookingError::CatalogUnavailable {
            reason: "503".to_string(),
        };
        assert!(catalog.is_fatal());
        assert!(!BookingError::Unauthenticated.is_fatal());
        assert_eq!(BookingError::Unauthenticated.surface(), ErrorSurface::Redirect);
    }
}
