//! State of one booking session.

use crate::error::{BookingError, FieldError};
use crate::payment::PaymentDispatcher;
use crate::session::{Identity, Redirect};
use crate::types::{
    AttemptId, BookingDraft, BookingRecord, BookingStatus, DraftSnapshot, LineItem, PricingBreakdown, ServiceId,
    ServiceOffering,
};
use std::fmt;

/// Wizard steps, in order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Schedule and roster or quantity
    #[default]
    CollectingDetails,
    /// Contact details
    CollectingContact,
    /// Draft frozen, submission under way
    AwaitingPayment,
    /// Booking number obtained (terminal)
    Submitted,
    /// User left the flow (terminal)
    Abandoned,
}

impl Step {
    /// Whether the wizard is finished
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Abandoned)
    }

    /// Whether the draft may still be edited
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::CollectingDetails | Self::CollectingContact)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollectingDetails => write!(f, "collecting details"),
            Self::CollectingContact => write!(f, "collecting contact"),
            Self::AwaitingPayment => write!(f, "awaiting payment"),
            Self::Submitted => write!(f, "submitted"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Progress of the offering fetch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Not started
    #[default]
    Idle,
    /// Request outstanding
    Loading,
    /// Offering available
    Loaded,
    /// Fetch failed; retry possible
    Failed {
        /// Why
        reason: String,
    },
}

/// Progress of the booking submission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Nothing outstanding
    #[default]
    Idle,
    /// Attempt outstanding; destructive actions are disabled
    InFlight {
        /// Outstanding attempt
        attempt: AttemptId,
    },
    /// Last attempt failed in transport; retry possible
    Failed {
        /// Why
        reason: String,
    },
}

/// State of one booking session
#[derive(Clone, Debug, Default)]
pub struct BookingState {
    /// Service being booked
    pub service_id: Option<ServiceId>,
    /// Signed-in caller
    pub identity: Option<Identity>,
    /// Offering fetch progress
    pub catalog: CatalogStatus,
    /// Normalised offering once loaded
    pub offering: Option<ServiceOffering>,
    /// Current step
    pub step: Step,
    /// Draft being edited
    pub draft: Option<BookingDraft>,
    /// Frozen copy while awaiting the booking service
    pub snapshot: Option<DraftSnapshot>,
    /// Submission progress
    pub submission: SubmissionStatus,
    /// Confirmed booking
    pub record: Option<BookingRecord>,
    /// Payment intent owner
    pub payments: PaymentDispatcher,
    /// Navigation requested from the host
    pub redirect: Option<Redirect>,
    /// Field-level errors from the last validation or rejection
    pub field_errors: Vec<FieldError>,
    /// Last error
    pub last_error: Option<BookingError>,
}

impl BookingState {
    /// Creates a new empty `BookingState`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster of the current draft
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        self.draft.as_ref().map_or(&[] as &[LineItem], BookingDraft::line_items)
    }

    /// Current breakdown
    #[must_use]
    pub fn pricing(&self) -> Option<&PricingBreakdown> {
        self.draft.as_ref().map(BookingDraft::pricing)
    }

    /// Status of the confirmed booking
    #[must_use]
    pub fn booking_status(&self) -> Option<BookingStatus> {
        self.record.as_ref().map(BookingRecord::status)
    }

    /// Whether a submission attempt is outstanding
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionStatus::InFlight { .. })
    }

    pub(crate) fn clear_errors(&mut self) {
        self.field_errors.clear();
        self.last_error = None;
    }

    pub(crate) fn reject(&mut self, error: BookingError) {
        tracing::warn!(step = %self.step, %error, "Booking command rejected");
        if let BookingError::Validation { errors } | BookingError::SubmissionRejected { errors } = &error {
            self.field_errors.clone_from(errors);
        }
        self.last_error = Some(error);
    }
}
