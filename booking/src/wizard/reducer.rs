//! Reducer for the booking wizard.
//!
//! Owns every transition of [`BookingState`]. Network work (catalog lookup,
//! submission, payment dispatch) is returned as effects; their results come
//! back as actions keyed by attempt id or correlation token so stale answers
//! can be recognised and dropped.

use super::actions::BookingAction;
use super::environment::BookingEnvironment;
use super::state::{BookingState, CatalogStatus, Step, SubmissionStatus};
use super::validation;
use crate::error::BookingError;
use crate::payment::{GatewayError, PaymentDispatcher, PaymentRequest, Reconciliation};
use crate::pricing::{self, Promotion};
use crate::roster;
use crate::session::{Identity, Redirect};
use crate::submission::SubmissionFailure;
use crate::types::{
    AttemptId, BookingDraft, BookingNumber, BookingRecord, BookingStatus, CorrelationToken, DraftSnapshot, Load,
    PaymentOutcome, ProviderOutcome, ServiceId, ServiceOffering,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use waypoint_core::{SmallVec, async_effect, delay, effect::Effect, reducer::Reducer, smallvec};
use waypoint_runtime::metrics::{BOOKING_PAYMENTS, BOOKING_SUBMISSIONS};

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

fn none() -> Effects {
    smallvec![Effect::None]
}

/// Reducer for the booking wizard
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    fn start(
        state: &mut BookingState,
        service_id: ServiceId,
        identity: Option<Identity>,
        env: &BookingEnvironment,
    ) -> Effects {
        if state.is_submitting() {
            state.reject(BookingError::SubmissionInFlight);
            return none();
        }

        tracing::info!(service_id = %service_id, signed_in = identity.is_some(), "Booking session started");
        *state = BookingState {
            service_id: Some(service_id.clone()),
            identity,
            catalog: CatalogStatus::Loading,
            ..BookingState::default()
        };

        smallvec![Self::fetch_offering(service_id, env)]
    }

    fn fetch_offering(service_id: ServiceId, env: &BookingEnvironment) -> Effect<BookingAction> {
        let catalog = Arc::clone(&env.catalog);
        let timeout = env.config.catalog_timeout;

        async_effect! {
            match tokio::time::timeout(timeout, catalog.fetch(service_id)).await {
                Ok(Ok(offering)) => Some(BookingAction::CatalogLoaded { offering }),
                Ok(Err(error)) => Some(BookingAction::CatalogFailed { reason: error.to_string() }),
                Err(_) => Some(BookingAction::CatalogFailed {
                    reason: format!("catalog lookup timed out after {}s", timeout.as_secs()),
                }),
            }
        }
    }

    fn catalog_loaded(state: &mut BookingState, offering: ServiceOffering) -> Effects {
        if state.catalog != CatalogStatus::Loading || state.service_id.as_ref() != Some(offering.id()) {
            tracing::debug!(service_id = %offering.id(), "Ignoring offering for a superseded lookup");
            return none();
        }

        let draft = BookingDraft::seed(&offering);
        tracing::info!(
            service_id = %offering.id(),
            kind = %offering.kind(),
            total = %draft.pricing().total,
            "Draft seeded"
        );

        state.draft = Some(draft);
        state.offering = Some(offering);
        state.catalog = CatalogStatus::Loaded;
        state.step = Step::CollectingDetails;
        state.clear_errors();
        none()
    }

    fn catalog_failed(state: &mut BookingState, reason: String) -> Effects {
        if state.catalog != CatalogStatus::Loading {
            return none();
        }
        state.catalog = CatalogStatus::Failed { reason: reason.clone() };
        state.reject(BookingError::CatalogUnavailable { reason });
        none()
    }

    fn retry_catalog(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
        let service_id = match (&state.catalog, &state.service_id) {
            (CatalogStatus::Failed { .. }, Some(service_id)) => service_id.clone(),
            _ => {
                state.reject(BookingError::InvalidTransition {
                    reason: "no failed catalog lookup to retry".to_string(),
                });
                return none();
            },
        };

        tracing::info!(service_id = %service_id, "Retrying catalog lookup");
        state.catalog = CatalogStatus::Loading;
        state.clear_errors();
        smallvec![Self::fetch_offering(service_id, env)]
    }

    fn identity_changed(state: &mut BookingState, identity: Option<Identity>) -> Effects {
        if identity.is_some() {
            state.redirect = None;
            if state.last_error == Some(BookingError::Unauthenticated) {
                state.last_error = None;
            }
        }
        state.identity = identity;
        none()
    }

    // ========================================================================
    // Draft edits
    // ========================================================================

    fn editable(state: &mut BookingState) -> Result<(&mut BookingDraft, &ServiceOffering), BookingError> {
        if !state.step.is_editable() {
            return Err(BookingError::InvalidTransition {
                reason: format!("draft cannot be edited while {}", state.step),
            });
        }
        match (state.draft.as_mut(), state.offering.as_ref()) {
            (Some(draft), Some(offering)) => Ok((draft, offering)),
            _ => Err(BookingError::InvalidTransition {
                reason: "no draft loaded".to_string(),
            }),
        }
    }

    /// Apply an edit to the draft; rejected edits leave it untouched.
    fn edit<F>(state: &mut BookingState, apply: F) -> Effects
    where
        F: FnOnce(&mut BookingDraft, &ServiceOffering) -> Result<(), BookingError>,
    {
        match Self::editable(state).and_then(|(draft, offering)| apply(draft, offering)) {
            Ok(()) => state.clear_errors(),
            Err(error) => state.reject(error),
        }
        none()
    }

    fn validate_promotion(promotion: Option<Promotion>) -> Result<(), BookingError> {
        match promotion {
            Some(Promotion::Flat(amount)) if amount < Decimal::ZERO => {
                Err(BookingError::field("promotion", "amount must not be negative"))
            },
            Some(Promotion::Percent(rate)) if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED => {
                Err(BookingError::field("promotion", "percentage must be between 0 and 100"))
            },
            _ => Ok(()),
        }
    }

    fn set_quantity(draft: &mut BookingDraft, offering: &ServiceOffering, quantity: Decimal) -> Result<(), BookingError> {
        if draft.kind().has_roster() {
            return Err(BookingError::NotApplicable {
                operation: "set quantity".to_string(),
                kind: draft.kind().to_string(),
            });
        }
        if quantity <= Decimal::ZERO {
            return Err(BookingError::field("quantity", "must be greater than zero"));
        }
        if quantity > pricing::MAX_QUANTITY {
            return Err(BookingError::field(
                "quantity",
                format!("must not exceed {}", pricing::MAX_QUANTITY),
            ));
        }
        draft.load = Load::Quantity(quantity);
        draft.reprice(offering);
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn advance(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
        match state.step {
            Step::CollectingDetails => {
                let errors = match Self::loaded(state) {
                    Ok((draft, offering)) => validation::validate_details(draft, offering),
                    Err(error) => {
                        state.reject(error);
                        return none();
                    },
                };
                if !errors.is_empty() {
                    state.reject(BookingError::Validation { errors });
                    return none();
                }

                state.step = Step::CollectingContact;
                state.clear_errors();
                tracing::info!("Details complete, collecting contact");
                none()
            },
            Step::CollectingContact => match Self::freeze_for_submission(state, env) {
                Ok((snapshot, identity)) => {
                    tracing::info!(
                        service_id = %snapshot.service_id(),
                        total = %snapshot.pricing().total,
                        "Draft frozen for submission"
                    );
                    state.step = Step::AwaitingPayment;
                    state.snapshot = Some(snapshot.clone());
                    state.clear_errors();
                    smallvec![Self::begin_submission(state, snapshot, identity, env)]
                },
                Err(error) => {
                    if error == BookingError::Unauthenticated {
                        state.redirect = Some(Redirect::SignInRequired);
                    }
                    state.reject(error);
                    none()
                },
            },
            Step::AwaitingPayment if state.is_submitting() => {
                state.reject(BookingError::SubmissionInFlight);
                none()
            },
            step => {
                state.reject(BookingError::InvalidTransition {
                    reason: format!("cannot advance while {step}"),
                });
                none()
            },
        }
    }

    fn loaded(state: &BookingState) -> Result<(&BookingDraft, &ServiceOffering), BookingError> {
        state
            .draft
            .as_ref()
            .zip(state.offering.as_ref())
            .ok_or_else(|| BookingError::InvalidTransition {
                reason: "no draft loaded".to_string(),
            })
    }

    fn freeze_for_submission(
        state: &BookingState,
        env: &BookingEnvironment,
    ) -> Result<(DraftSnapshot, Identity), BookingError> {
        let (draft, offering) = Self::loaded(state)?;

        let errors = validation::validate_contact(draft.contact());
        if !errors.is_empty() {
            return Err(BookingError::Validation { errors });
        }

        let identity = state.identity.clone().ok_or(BookingError::Unauthenticated)?;
        let snapshot = DraftSnapshot::freeze(draft, offering, env.clock.now())?;
        Ok((snapshot, identity))
    }

    fn go_back(state: &mut BookingState, to: Step) -> Effects {
        if state.step.is_terminal() || to >= state.step {
            state.reject(BookingError::InvalidTransition {
                reason: format!("cannot go back from {} to {to}", state.step),
            });
            return none();
        }
        if state.is_submitting() {
            state.reject(BookingError::SubmissionInFlight);
            return none();
        }

        let to = if state.step == Step::AwaitingPayment {
            tracing::info!("Leaving payment step, snapshot discarded");
            state.snapshot = None;
            state.submission = SubmissionStatus::Idle;
            Step::CollectingDetails
        } else {
            to
        };
        state.step = to;
        state.clear_errors();
        none()
    }

    fn abandon(state: &mut BookingState) -> Effects {
        if state.is_submitting() {
            state.reject(BookingError::SubmissionInFlight);
            return none();
        }
        if state.step.is_terminal() {
            state.reject(BookingError::InvalidTransition {
                reason: format!("cannot abandon a {} booking", state.step),
            });
            return none();
        }

        tracing::info!(step = %state.step, "Booking abandoned");
        state.step = Step::Abandoned;
        state.snapshot = None;
        state.submission = SubmissionStatus::Idle;
        state.clear_errors();
        none()
    }

    // ========================================================================
    // Submission
    // ========================================================================

    fn begin_submission(
        state: &mut BookingState,
        snapshot: DraftSnapshot,
        identity: Identity,
        env: &BookingEnvironment,
    ) -> Effect<BookingAction> {
        let attempt = AttemptId::from_uuid(env.ids.next_id());
        state.submission = SubmissionStatus::InFlight { attempt };

        let client = Arc::clone(&env.submissions);
        let timeout = env.config.submission_timeout;

        async_effect! {
            let (outcome, action) = match tokio::time::timeout(timeout, client.submit(snapshot, identity)).await {
                Ok(Ok(receipt)) => (
                    "created",
                    BookingAction::SubmissionSucceeded {
                        attempt,
                        booking_number: receipt.booking_number,
                        status: receipt.status,
                    },
                ),
                Ok(Err(failure)) => (
                    match failure {
                        SubmissionFailure::Rejected { .. } => "rejected",
                        SubmissionFailure::Unauthenticated => "unauthenticated",
                        SubmissionFailure::Transport { .. } => "transport_error",
                    },
                    BookingAction::SubmissionFailed { attempt, failure },
                ),
                Err(_) => (
                    "timeout",
                    BookingAction::SubmissionFailed {
                        attempt,
                        failure: SubmissionFailure::Transport {
                            reason: format!("booking service did not answer within {}s", timeout.as_secs()),
                        },
                    },
                ),
            };
            metrics::counter!(BOOKING_SUBMISSIONS, "outcome" => outcome).increment(1);
            Some(action)
        }
    }

    fn is_current_attempt(state: &BookingState, attempt: AttemptId) -> bool {
        let current = state.submission == SubmissionStatus::InFlight { attempt };
        if !current {
            tracing::debug!(%attempt, "Ignoring result of a superseded submission attempt");
        }
        current
    }

    fn submission_succeeded(
        state: &mut BookingState,
        attempt: AttemptId,
        booking_number: BookingNumber,
        status: BookingStatus,
        env: &BookingEnvironment,
    ) -> Effects {
        if !Self::is_current_attempt(state, attempt) {
            return none();
        }
        state.submission = SubmissionStatus::Idle;

        let Some(snapshot) = state.snapshot.take() else {
            state.reject(BookingError::InvalidTransition {
                reason: "submission finished without a frozen draft".to_string(),
            });
            return none();
        };

        if status != BookingStatus::Created {
            tracing::warn!(
                booking_number = %booking_number,
                reported = %status,
                "Submission receipt reported a non-initial status, recording as created"
            );
        }
        tracing::info!(
            booking_number = %booking_number,
            total = %snapshot.pricing().total,
            "Booking submitted"
        );
        state.record = Some(BookingRecord::new(
            booking_number,
            BookingStatus::Created,
            snapshot,
            env.clock.now(),
        ));
        state.payments = PaymentDispatcher::new();
        state.step = Step::Submitted;
        state.redirect = None;
        state.clear_errors();
        none()
    }

    fn submission_failed(state: &mut BookingState, attempt: AttemptId, failure: SubmissionFailure) -> Effects {
        if !Self::is_current_attempt(state, attempt) {
            return none();
        }

        match failure {
            SubmissionFailure::Rejected { errors } => {
                state.step = Step::CollectingDetails;
                state.snapshot = None;
                state.submission = SubmissionStatus::Idle;
                state.reject(BookingError::SubmissionRejected { errors });
            },
            SubmissionFailure::Transport { reason } => {
                state.submission = SubmissionStatus::Failed { reason: reason.clone() };
                state.reject(BookingError::SubmissionTransport { reason });
            },
            SubmissionFailure::Unauthenticated => {
                state.submission = SubmissionStatus::Failed {
                    reason: "sign-in required".to_string(),
                };
                state.identity = None;
                state.redirect = Some(Redirect::SignInRequired);
                state.reject(BookingError::Unauthenticated);
            },
        }
        none()
    }

    fn retry_submission(state: &mut BookingState, env: &BookingEnvironment) -> Effects {
        if state.is_submitting() {
            state.reject(BookingError::SubmissionInFlight);
            return none();
        }

        let snapshot = match (&state.step, &state.submission, &state.snapshot) {
            (Step::AwaitingPayment, SubmissionStatus::Failed { .. }, Some(snapshot)) => snapshot.clone(),
            _ => {
                state.reject(BookingError::InvalidTransition {
                    reason: "no failed submission to retry".to_string(),
                });
                return none();
            },
        };
        let Some(identity) = state.identity.clone() else {
            state.redirect = Some(Redirect::SignInRequired);
            state.reject(BookingError::Unauthenticated);
            return none();
        };

        tracing::info!(service_id = %snapshot.service_id(), "Resubmitting frozen draft");
        state.clear_errors();
        smallvec![Self::begin_submission(state, snapshot, identity, env)]
    }

    // ========================================================================
    // Payment
    // ========================================================================

    fn initiate_payment(state: &mut BookingState, provider_id: String, env: &BookingEnvironment) -> Effects {
        let Some(record) = state.record.as_mut() else {
            state.reject(BookingError::InvalidTransition {
                reason: "no booking to pay for".to_string(),
            });
            return none();
        };

        let token = CorrelationToken::from_uuid(env.ids.next_id());
        match state.payments.initiate(record, provider_id, token, env.clock.now()) {
            Ok(request) => {
                tracing::info!(
                    booking_number = %request.booking_number,
                    correlation_token = %token,
                    provider_id = %request.provider_id,
                    amount = %request.amount,
                    "Payment initiated"
                );
                state.last_error = None;
                smallvec![
                    Self::dispatch_payment(request, env),
                    delay! {
                        duration: env.config.payment_timeout,
                        action: BookingAction::PaymentTimedOut { token }
                    },
                ]
            },
            Err(error) => {
                state.reject(error);
                none()
            },
        }
    }

    fn dispatch_payment(request: PaymentRequest, env: &BookingEnvironment) -> Effect<BookingAction> {
        let gateway = Arc::clone(&env.payments);
        let timeout = env.config.payment_timeout;
        let token = request.correlation_token;

        async_effect! {
            let (outcome, action) = match tokio::time::timeout(timeout, gateway.initiate(request)).await {
                Ok(Ok(())) => ("dispatched", BookingAction::PaymentDispatched { token }),
                Ok(Err(error)) => (
                    "dispatch_failed",
                    BookingAction::PaymentDispatchFailed { token, reason: error.to_string() },
                ),
                Err(_) => (
                    "dispatch_timeout",
                    BookingAction::PaymentDispatchFailed { token, reason: GatewayError::Timeout.to_string() },
                ),
            };
            metrics::counter!(BOOKING_PAYMENTS, "outcome" => outcome).increment(1);
            Some(action)
        }
    }

    fn reconcile_payment(state: &mut BookingState, token: CorrelationToken, outcome: ProviderOutcome) -> Effects {
        let Some(record) = state.record.as_mut() else {
            tracing::debug!(correlation_token = %token, "Payment outcome without a booking");
            return none();
        };
        let booking_number = record.booking_number().clone();

        match state.payments.reconcile(record, token, outcome) {
            Reconciliation::Applied(PaymentOutcome::Succeeded) => {
                tracing::info!(booking_number = %booking_number, correlation_token = %token, "Payment succeeded");
                state.last_error = None;
            },
            Reconciliation::Applied(_) => {
                tracing::info!(booking_number = %booking_number, correlation_token = %token, "Payment failed");
                state.reject(BookingError::PaymentFailed {
                    reason: "declined by provider".to_string(),
                });
            },
            Reconciliation::Duplicate | Reconciliation::Stale => {
                tracing::debug!(correlation_token = %token, ?outcome, "Payment outcome already handled");
            },
            Reconciliation::Conflict { recorded, ignored } => {
                tracing::warn!(
                    booking_number = %booking_number,
                    correlation_token = %token,
                    ?recorded,
                    ?ignored,
                    "Conflicting payment outcome ignored"
                );
            },
        }
        none()
    }

    fn payment_failed(state: &mut BookingState, token: CorrelationToken, reason: String) -> Effects {
        let Some(record) = state.record.as_mut() else {
            return none();
        };

        match state.payments.fail(record, token) {
            Reconciliation::Applied(_) => {
                tracing::info!(correlation_token = %token, %reason, "Payment failed");
                state.reject(BookingError::PaymentFailed { reason });
            },
            _ => tracing::debug!(correlation_token = %token, "Ignoring failure of a resolved payment"),
        }
        none()
    }

    fn cancel_booking(state: &mut BookingState) -> Effects {
        let Some(record) = state.record.as_mut() else {
            state.reject(BookingError::InvalidTransition {
                reason: "no booking to cancel".to_string(),
            });
            return none();
        };

        match state.payments.cancel(record) {
            Ok(()) => {
                tracing::info!(booking_number = %record.booking_number(), "Booking cancelled");
                state.last_error = None;
            },
            Err(error) => state.reject(error),
        }
        none()
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Session and catalog ==========
            BookingAction::Start { service_id, identity } => Self::start(state, service_id, identity, env),
            BookingAction::IdentityChanged { identity } => Self::identity_changed(state, identity),
            BookingAction::CatalogLoaded { offering } => Self::catalog_loaded(state, offering),
            BookingAction::CatalogFailed { reason } => Self::catalog_failed(state, reason),
            BookingAction::RetryCatalog => Self::retry_catalog(state, env),

            // ========== Draft edits ==========
            BookingAction::SetSchedule { schedule } => Self::edit(state, |draft, _| {
                draft.schedule = schedule;
                Ok(())
            }),
            BookingAction::SetContact { contact } => Self::edit(state, |draft, _| {
                draft.contact = contact;
                Ok(())
            }),
            BookingAction::SetNotes { notes } => Self::edit(state, |draft, _| {
                draft.notes = notes;
                Ok(())
            }),
            BookingAction::SetUrgency { urgent } => Self::edit(state, |draft, offering| {
                draft.options.urgent = urgent;
                draft.reprice(offering);
                Ok(())
            }),
            BookingAction::ApplyPromotion { promotion } => Self::edit(state, |draft, offering| {
                Self::validate_promotion(promotion)?;
                draft.options.promotion = promotion;
                draft.reprice(offering);
                Ok(())
            }),
            BookingAction::SetQuantity { quantity } => {
                Self::edit(state, |draft, offering| Self::set_quantity(draft, offering, quantity))
            },
            BookingAction::AddLineItem => Self::edit(state, roster::add_line_item),
            BookingAction::RemoveLineItem { index } => {
                Self::edit(state, |draft, offering| roster::remove_line_item(draft, offering, index))
            },
            BookingAction::UpdateLineItem {
                index,
                name,
                age,
                category,
            } => Self::edit(state, |draft, _| roster::update_line_item(draft, index, name, age, category)),
            BookingAction::AssignSlot { index, slot } => {
                Self::edit(state, |draft, offering| roster::assign_slot(draft, offering, index, slot))
            },
            BookingAction::ClearSlot { index } => Self::edit(state, |draft, _| roster::clear_slot(draft, index)),

            // ========== Navigation ==========
            BookingAction::Advance => Self::advance(state, env),
            BookingAction::GoBack { to } => Self::go_back(state, to),
            BookingAction::Abandon => Self::abandon(state),

            // ========== Submission ==========
            BookingAction::SubmissionSucceeded {
                attempt,
                booking_number,
                status,
            } => Self::submission_succeeded(state, attempt, booking_number, status, env),
            BookingAction::SubmissionFailed { attempt, failure } => Self::submission_failed(state, attempt, failure),
            BookingAction::RetrySubmission => Self::retry_submission(state, env),

            // ========== Payment ==========
            BookingAction::InitiatePayment { provider_id } => Self::initiate_payment(state, provider_id, env),
            BookingAction::PaymentDispatched { token } => {
                tracing::debug!(correlation_token = %token, "Payment request accepted by provider");
                none()
            },
            BookingAction::PaymentDispatchFailed { token, reason } => Self::payment_failed(state, token, reason),
            BookingAction::ReconcilePayment { token, outcome } => Self::reconcile_payment(state, token, outcome),
            BookingAction::PaymentTimedOut { token } => {
                Self::payment_failed(state, token, "no outcome from payment provider in time".to_string())
            },
            BookingAction::CancelBooking => Self::cancel_booking(state),
        }
    }
}
