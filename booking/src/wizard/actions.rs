//! Actions for the booking wizard: user intents plus async results.

use crate::pricing::Promotion;
use crate::session::Identity;
use crate::submission::SubmissionFailure;
use crate::types::{
    AttemptId, BookingNumber, BookingStatus, Contact, CorrelationToken, PassengerCategory, ProviderOutcome,
    ScheduleSelection, ServiceId, ServiceOffering,
};
use crate::wizard::state::Step;
use rust_decimal::Decimal;

/// Everything the booking wizard reacts to
#[derive(Clone, Debug, PartialEq)]
pub enum BookingAction {
    // ========== Session and catalog ==========
    /// Begin a booking for a service
    Start {
        /// Service to book
        service_id: ServiceId,
        /// Signed-in caller, if any
        identity: Option<Identity>,
    },
    /// The caller signed in or out
    IdentityChanged {
        /// New identity
        identity: Option<Identity>,
    },
    /// Offering fetched and normalised
    CatalogLoaded {
        /// The offering
        offering: ServiceOffering,
    },
    /// Offering could not be fetched
    CatalogFailed {
        /// Why
        reason: String,
    },
    /// Fetch the offering again after a failure
    RetryCatalog,

    // ========== Draft edits ==========
    /// Replace the schedule selection
    SetSchedule {
        /// New selection
        schedule: ScheduleSelection,
    },
    /// Replace the contact record
    SetContact {
        /// New contact
        contact: Contact,
    },
    /// Replace notes and special requirements
    SetNotes {
        /// New notes
        notes: String,
    },
    /// Toggle urgent handling
    SetUrgency {
        /// Whether urgent
        urgent: bool,
    },
    /// Apply or clear a promotion
    ApplyPromotion {
        /// Promotion, `None` to clear
        promotion: Option<Promotion>,
    },
    /// Set the cargo quantity
    SetQuantity {
        /// Weight or volume, greater than zero
        quantity: Decimal,
    },
    /// Append a blank line item
    AddLineItem,
    /// Remove a line item
    RemoveLineItem {
        /// Position in the roster
        index: usize,
    },
    /// Edit a line item's identity fields
    UpdateLineItem {
        /// Position in the roster
        index: usize,
        /// Full name
        name: String,
        /// Age in years
        age: Option<u8>,
        /// Fare category
        category: PassengerCategory,
    },
    /// Assign a seat or slot
    AssignSlot {
        /// Position in the roster
        index: usize,
        /// Slot identifier
        slot: String,
    },
    /// Release a seat or slot
    ClearSlot {
        /// Position in the roster
        index: usize,
    },

    // ========== Navigation ==========
    /// Validate the current step and move forward
    Advance,
    /// Move back to an earlier step, keeping entered data
    GoBack {
        /// Target step
        to: Step,
    },
    /// Leave the wizard without booking
    Abandon,

    // ========== Submission ==========
    /// The booking service created the booking
    SubmissionSucceeded {
        /// Attempt that produced this result
        attempt: AttemptId,
        /// Issued booking number
        booking_number: BookingNumber,
        /// Initial status
        status: BookingStatus,
    },
    /// The submission attempt failed
    SubmissionFailed {
        /// Attempt that produced this result
        attempt: AttemptId,
        /// Failure
        failure: SubmissionFailure,
    },
    /// Resubmit the frozen snapshot after a transport failure
    RetrySubmission,

    // ========== Payment ==========
    /// Start paying with a provider
    InitiatePayment {
        /// Provider identifier
        provider_id: String,
    },
    /// The provider accepted the payment request
    PaymentDispatched {
        /// Intent token
        token: CorrelationToken,
    },
    /// The payment request could not be delivered
    PaymentDispatchFailed {
        /// Intent token
        token: CorrelationToken,
        /// Why
        reason: String,
    },
    /// Provider callback arrived
    ReconcilePayment {
        /// Intent token
        token: CorrelationToken,
        /// Outcome
        outcome: ProviderOutcome,
    },
    /// No outcome arrived within the payment timeout
    PaymentTimedOut {
        /// Intent token
        token: CorrelationToken,
    },
    /// Cancel the booking
    CancelBooking,
}
