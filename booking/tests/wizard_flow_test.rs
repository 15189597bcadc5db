//! End-to-end booking flows through a live store with in-memory collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use waypoint_booking::catalog::{OfferingDto, ScheduleOptionsDto};
use waypoint_booking::error::FieldError;
use waypoint_booking::mocks::{
    GatewayScript, InMemoryCatalog, InMemoryPaymentGateway, InMemorySubmissionClient, SubmissionScript,
};
use waypoint_booking::types::{
    BookingStatus, Contact, PassengerCategory, ProviderOutcome, ScheduleSelection, ServiceId, ServiceKind,
};
use waypoint_booking::wizard::{CatalogStatus, SubmissionStatus};
use waypoint_booking::{
    BookingAction, BookingConfig, BookingEnvironment, BookingError, BookingReducer, BookingState, Identity, Step,
};
use waypoint_runtime::Store;
use waypoint_testing::{SequentialIds, test_clock};

type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    store: BookingStore,
    catalog: Arc<InMemoryCatalog>,
    submissions: Arc<InMemorySubmissionClient>,
    payments: Arc<InMemoryPaymentGateway>,
}

fn harness(config: BookingConfig) -> Harness {
    let catalog = InMemoryCatalog::new()
        .with_offering(
            OfferingDto::new("ktm-pkr", ServiceKind::SeatTransport, dec!(800), "NPR")
                .with_tax("VAT", dec!(13))
                .with_schedule(ScheduleOptionsDto {
                    time_slots: vec!["07:00".into()],
                    slots: vec!["A1".into(), "A2".into(), "A3".into()],
                    ..ScheduleOptionsDto::default()
                }),
        )
        .with_offering(
            OfferingDto::new("ktm-freight", ServiceKind::Cargo, dec!(75), "NPR").with_tax("VAT", dec!(13)),
        )
        .shared();
    let submissions = InMemorySubmissionClient::new().shared();
    let payments = InMemoryPaymentGateway::new().shared();

    let env = BookingEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIds::new()),
        catalog.clone(),
        submissions.clone(),
        payments.clone(),
    )
    .with_config(config);

    Harness {
        store: Store::new(BookingState::new(), BookingReducer::new(), env),
        catalog,
        submissions,
        payments,
    }
}

fn identity() -> Identity {
    Identity::new("u-1", "Asha Gurung", "token-1")
}

fn contact() -> BookingAction {
    BookingAction::SetContact {
        contact: Contact {
            name: "Asha Gurung".into(),
            phone: "+977 9841000000".into(),
            email: "asha@example.com".into(),
            alt_phone: None,
        },
    }
}

fn schedule() -> BookingAction {
    BookingAction::SetSchedule {
        schedule: ScheduleSelection {
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            time_slot: Some("07:00".into()),
            ..ScheduleSelection::default()
        },
    }
}

async fn start(store: &BookingStore, service: &str) {
    store
        .send_and_wait_for(
            BookingAction::Start {
                service_id: ServiceId::new(service),
                identity: Some(identity()),
            },
            |action| matches!(action, BookingAction::CatalogLoaded { .. } | BookingAction::CatalogFailed { .. }),
            WAIT,
        )
        .await
        .unwrap();
}

/// Two named passengers, contact filled in, parked on the contact step
async fn fill_bus_booking(store: &BookingStore) {
    start(store, "ktm-pkr").await;
    for action in [
        schedule(),
        BookingAction::AddLineItem,
        BookingAction::UpdateLineItem {
            index: 0,
            name: "Asha Gurung".into(),
            age: Some(31),
            category: PassengerCategory::Adult,
        },
        BookingAction::UpdateLineItem {
            index: 1,
            name: "Bikash Gurung".into(),
            age: Some(8),
            category: PassengerCategory::Child,
        },
        BookingAction::Advance,
        contact(),
    ] {
        store.send(action).await.unwrap();
    }
    assert_eq!(store.state(|s| s.step).await, Step::CollectingContact);
}

async fn submit(store: &BookingStore) -> BookingAction {
    store
        .send_and_wait_for(
            BookingAction::Advance,
            |action| {
                matches!(
                    action,
                    BookingAction::SubmissionSucceeded { .. } | BookingAction::SubmissionFailed { .. }
                )
            },
            WAIT,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn seat_transport_booking_is_paid() {
    let h = harness(BookingConfig::default());
    fill_bus_booking(&h.store).await;
    assert_eq!(h.store.state(|s| s.pricing().unwrap().total).await, dec!(1808));

    let result = submit(&h.store).await;
    assert!(matches!(result, BookingAction::SubmissionSucceeded { .. }));

    let (number, status, total) = h
        .store
        .state(|s| {
            let record = s.record.as_ref().unwrap();
            (record.booking_number().to_string(), record.status(), record.total())
        })
        .await;
    assert_eq!(number, "WP-1001");
    assert_eq!(status, BookingStatus::Created);
    assert_eq!(total, dec!(1808));
    assert_eq!(h.store.state(|s| s.step).await, Step::Submitted);

    let submitted = h.submissions.submissions();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].pricing().total, dec!(1808));
    assert_eq!(h.submissions.callers(), vec!["u-1".to_string()]);

    h.store
        .send_and_wait_for(
            BookingAction::InitiatePayment {
                provider_id: "esewa".into(),
            },
            |action| matches!(action, BookingAction::PaymentDispatched { .. }),
            WAIT,
        )
        .await
        .unwrap();

    let requests = h.payments.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, dec!(1808));
    assert_eq!(requests[0].booking_number.as_str(), "WP-1001");
    assert_eq!(
        h.store.state(|s| s.booking_status()).await,
        Some(BookingStatus::AwaitingPayment)
    );

    h.store
        .send(BookingAction::ReconcilePayment {
            token: requests[0].correlation_token,
            outcome: ProviderOutcome::Succeeded,
        })
        .await
        .unwrap();

    assert_eq!(h.store.state(|s| s.booking_status()).await, Some(BookingStatus::Paid));
    assert!(h.store.state(|s| s.last_error.is_none()).await);
}

#[tokio::test]
async fn cargo_booking_prices_by_quantity() {
    let h = harness(BookingConfig::default());
    start(&h.store, "ktm-freight").await;

    h.store.send(BookingAction::AddLineItem).await.unwrap();
    assert!(matches!(
        h.store.state(|s| s.last_error.clone()).await,
        Some(BookingError::NotApplicable { .. })
    ));

    h.store
        .send(BookingAction::SetQuantity { quantity: dec!(500) })
        .await
        .unwrap();

    let pricing = h.store.state(|s| s.pricing().cloned()).await.unwrap();
    assert_eq!(pricing.base, dec!(37500));
    assert_eq!(pricing.taxes[0].amount, dec!(4875));
    assert_eq!(pricing.total, dec!(42375));

    for action in [
        BookingAction::SetSchedule {
            schedule: ScheduleSelection {
                date: NaiveDate::from_ymd_opt(2025, 3, 2),
                ..ScheduleSelection::default()
            },
        },
        BookingAction::Advance,
        contact(),
    ] {
        h.store.send(action).await.unwrap();
    }

    assert!(matches!(submit(&h.store).await, BookingAction::SubmissionSucceeded { .. }));
    assert_eq!(h.store.state(|s| s.record.as_ref().unwrap().total()).await, dec!(42375));
}

#[tokio::test]
async fn catalog_outage_can_be_retried() {
    let h = harness(BookingConfig::default());
    h.catalog.fail_next(1);

    start(&h.store, "ktm-pkr").await;
    assert!(matches!(h.store.state(|s| s.catalog.clone()).await, CatalogStatus::Failed { .. }));
    assert!(h.store.state(|s| s.last_error.as_ref().unwrap().is_fatal()).await);

    h.store
        .send_and_wait_for(
            BookingAction::RetryCatalog,
            |action| matches!(action, BookingAction::CatalogLoaded { .. }),
            WAIT,
        )
        .await
        .unwrap();

    assert_eq!(h.store.state(|s| s.catalog.clone()).await, CatalogStatus::Loaded);
    assert_eq!(h.store.state(|s| s.line_items().len()).await, 1);
    assert_eq!(h.catalog.lookups(), 2);
}

#[tokio::test]
async fn transport_failure_resubmits_same_snapshot() {
    let h = harness(BookingConfig::default());
    h.submissions.push(SubmissionScript::Transport("connection reset".into()));
    fill_bus_booking(&h.store).await;

    assert!(matches!(submit(&h.store).await, BookingAction::SubmissionFailed { .. }));
    assert_eq!(h.store.state(|s| s.step).await, Step::AwaitingPayment);
    assert!(matches!(
        h.store.state(|s| s.submission.clone()).await,
        SubmissionStatus::Failed { .. }
    ));

    h.store
        .send_and_wait_for(
            BookingAction::RetrySubmission,
            |action| matches!(action, BookingAction::SubmissionSucceeded { .. }),
            WAIT,
        )
        .await
        .unwrap();

    let submitted = h.submissions.submissions();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0], submitted[1]);
    assert_eq!(h.store.state(|s| s.step).await, Step::Submitted);
}

#[tokio::test]
async fn rejection_returns_to_details_with_field_errors() {
    let h = harness(BookingConfig::default());
    h.submissions.push(SubmissionScript::Reject(vec![FieldError::new(
        "schedule.time_slot",
        "departure is full",
    )]));
    fill_bus_booking(&h.store).await;

    assert!(matches!(submit(&h.store).await, BookingAction::SubmissionFailed { .. }));

    let (step, errors, names) = h
        .store
        .state(|s| {
            (
                s.step,
                s.field_errors.clone(),
                s.line_items().iter().map(|item| item.name.clone()).collect::<Vec<_>>(),
            )
        })
        .await;
    assert_eq!(step, Step::CollectingDetails);
    assert_eq!(errors[0].field, "schedule.time_slot");
    assert_eq!(names, vec!["Asha Gurung", "Bikash Gurung"]);
    assert!(h.store.state(|s| s.snapshot.is_none()).await);
}

#[tokio::test]
async fn revoked_token_redirects_to_sign_in() {
    let h = harness(BookingConfig::default());
    h.submissions.push(SubmissionScript::Unauthenticated);
    fill_bus_booking(&h.store).await;

    assert!(matches!(submit(&h.store).await, BookingAction::SubmissionFailed { .. }));
    assert!(h.store.state(|s| s.redirect.is_some()).await);
    assert!(h.store.state(|s| s.identity.is_none()).await);

    h.store
        .send(BookingAction::IdentityChanged {
            identity: Some(identity()),
        })
        .await
        .unwrap();
    h.store
        .send_and_wait_for(
            BookingAction::RetrySubmission,
            |action| matches!(action, BookingAction::SubmissionSucceeded { .. }),
            WAIT,
        )
        .await
        .unwrap();

    assert!(h.store.state(|s| s.redirect.is_none()).await);
    assert_eq!(h.store.state(|s| s.step).await, Step::Submitted);
}

#[tokio::test(start_paused = true)]
async fn silent_booking_service_times_out_as_transport_failure() {
    let h = harness(BookingConfig::default().with_submission_timeout(Duration::from_secs(30)));
    h.submissions.push(SubmissionScript::Hang);
    fill_bus_booking(&h.store).await;

    let result = h
        .store
        .send_and_wait_for(
            BookingAction::Advance,
            |action| matches!(action, BookingAction::SubmissionFailed { .. }),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert!(matches!(result, BookingAction::SubmissionFailed { .. }));
    assert!(matches!(
        h.store.state(|s| s.last_error.clone()).await,
        Some(BookingError::SubmissionTransport { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn unanswered_payment_times_out_and_can_be_retried() {
    let h = harness(BookingConfig::default().with_payment_timeout(Duration::from_secs(300)));
    h.payments.push(GatewayScript::Hang);
    fill_bus_booking(&h.store).await;
    assert!(matches!(submit(&h.store).await, BookingAction::SubmissionSucceeded { .. }));

    h.store
        .send_and_wait_for(
            BookingAction::InitiatePayment {
                provider_id: "esewa".into(),
            },
            |action| matches!(action, BookingAction::PaymentTimedOut { .. }),
            Duration::from_secs(600),
        )
        .await
        .unwrap();

    assert_eq!(
        h.store.state(|s| s.booking_status()).await,
        Some(BookingStatus::PaymentFailed)
    );
    assert!(matches!(
        h.store.state(|s| s.last_error.clone()).await,
        Some(BookingError::PaymentFailed { .. })
    ));

    h.store
        .send_and_wait_for(
            BookingAction::InitiatePayment {
                provider_id: "khalti".into(),
            },
            |action| matches!(action, BookingAction::PaymentDispatched { .. }),
            WAIT,
        )
        .await
        .unwrap();

    let requests = h.payments.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].correlation_token, requests[1].correlation_token);

    // A late callback for the abandoned intent changes nothing
    h.store
        .send(BookingAction::ReconcilePayment {
            token: requests[0].correlation_token,
            outcome: ProviderOutcome::Succeeded,
        })
        .await
        .unwrap();
    assert_eq!(
        h.store.state(|s| s.booking_status()).await,
        Some(BookingStatus::AwaitingPayment)
    );

    h.store
        .send(BookingAction::ReconcilePayment {
            token: requests[1].correlation_token,
            outcome: ProviderOutcome::Succeeded,
        })
        .await
        .unwrap();
    assert_eq!(h.store.state(|s| s.booking_status()).await, Some(BookingStatus::Paid));
}

#[tokio::test]
async fn abandoning_before_submission_sends_nothing() {
    let h = harness(BookingConfig::default());
    fill_bus_booking(&h.store).await;

    h.store.send(BookingAction::Abandon).await.unwrap();

    assert_eq!(h.store.state(|s| s.step).await, Step::Abandoned);
    assert!(h.submissions.submissions().is_empty());

    h.store.send(BookingAction::Advance).await.unwrap();
    assert_eq!(h.store.state(|s| s.step).await, Step::Abandoned);
    assert!(h.submissions.submissions().is_empty());
}
