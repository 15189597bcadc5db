//! Booking Wizard Demo
//!
//! Walks one seat-transport booking through the whole flow against in-memory
//! collaborators:
//! - Catalog lookup and draft seeding
//! - Roster edits with live repricing
//! - Submission and booking number
//! - Payment handoff and provider callback
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin waypoint-demo
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_booking::catalog::{OfferingDto, ScheduleOptionsDto};
use waypoint_booking::mocks::{InMemoryCatalog, InMemoryPaymentGateway, InMemorySubmissionClient};
use waypoint_booking::types::{
    Contact, PassengerCategory, PricingBreakdown, ProviderOutcome, ScheduleSelection, ServiceId, ServiceKind,
};
use waypoint_booking::{BookingAction, BookingConfig, BookingEnvironment, BookingReducer, BookingState, Identity};
use waypoint_core::environment::{SystemClock, UuidGenerator};
use waypoint_runtime::Store;
use waypoint_runtime::metrics::MetricsRecorder;

const SERVICE: &str = "ktm-pkr-0700";

fn print_breakdown(pricing: &PricingBreakdown) {
    println!("   Base:     {} {}", pricing.currency, pricing.base);
    for tax in &pricing.taxes {
        println!("   {:<9} {} {}", format!("{}:", tax.name), pricing.currency, tax.amount);
    }
    if pricing.discount > Decimal::ZERO {
        println!("   Discount: {} -{}", pricing.currency, pricing.discount);
    }
    println!("   Total:    {} {}\n", pricing.currency, pricing.total);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = BookingConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},waypoint_booking=debug", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut recorder = MetricsRecorder::new();
    recorder.install()?;

    println!("\n============================================");
    println!("   Waypoint Booking - Live Demo");
    println!("============================================\n");

    let catalog = InMemoryCatalog::new()
        .with_offering(
            OfferingDto::new(SERVICE, ServiceKind::SeatTransport, Decimal::new(800, 0), "npr")
                .with_tax("VAT", Decimal::new(13, 0))
                .with_schedule(ScheduleOptionsDto {
                    time_slots: vec!["07:00".into(), "13:30".into()],
                    boarding_points: vec!["Kalanki".into(), "Gongabu".into()],
                    dropping_points: vec!["Lakeside".into()],
                    slots: (1..=12).map(|n| format!("A{n}")).collect(),
                }),
        )
        .shared();
    let submissions = InMemorySubmissionClient::new()
        .with_latency(Duration::from_millis(150))
        .shared();
    let payments = InMemoryPaymentGateway::new().shared();

    let env = BookingEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
        catalog,
        submissions,
        payments,
    )
    .with_config(config.clone());
    let store = Store::new(BookingState::new(), BookingReducer::new(), env);

    // Step 1: catalog lookup
    println!("1. Loading service {SERVICE}...");
    store
        .send_and_wait_for(
            BookingAction::Start {
                service_id: ServiceId::new(SERVICE),
                identity: Some(Identity::new("u-1001", "Asha Gurung", "demo-token")),
            },
            |action| matches!(action, BookingAction::CatalogLoaded { .. } | BookingAction::CatalogFailed { .. }),
            config.catalog_timeout,
        )
        .await?;
    if let Some(pricing) = store.state(|s| s.pricing().cloned()).await {
        println!("   Draft seeded with one passenger");
        print_breakdown(&pricing);
    }

    // Step 2: details
    println!("2. Two passengers, seats A3 and A4...");
    let details = [
        BookingAction::SetSchedule {
            schedule: ScheduleSelection {
                date: NaiveDate::from_ymd_opt(2025, 3, 1),
                time_slot: Some("07:00".into()),
                boarding_point: Some("Kalanki".into()),
                dropping_point: Some("Lakeside".into()),
            },
        },
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
        BookingAction::AssignSlot {
            index: 0,
            slot: "A3".into(),
        },
        BookingAction::AssignSlot {
            index: 1,
            slot: "A4".into(),
        },
        BookingAction::Advance,
    ];
    for action in details {
        store.send(action).await?;
    }
    if let Some(pricing) = store.state(|s| s.pricing().cloned()).await {
        print_breakdown(&pricing);
    }

    // Step 3: contact and submission
    println!("3. Contact details and submission...");
    store
        .send(BookingAction::SetContact {
            contact: Contact {
                name: "Asha Gurung".into(),
                phone: "+977 9841000000".into(),
                email: "asha@example.com".into(),
                alt_phone: None,
            },
        })
        .await?;
    store
        .send_and_wait_for(
            BookingAction::Advance,
            |action| {
                matches!(
                    action,
                    BookingAction::SubmissionSucceeded { .. } | BookingAction::SubmissionFailed { .. }
                )
            },
            config.submission_timeout,
        )
        .await?;

    let (number, status) = store
        .state(|s| {
            s.record
                .as_ref()
                .map(|record| (record.booking_number().clone(), record.status()))
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("booking was not created"))?;
    println!("   Booking number: {number}");
    println!("   Status:         {status}\n");

    // Step 4: payment
    println!("4. Paying with esewa...");
    store
        .send_and_wait_for(
            BookingAction::InitiatePayment {
                provider_id: "esewa".into(),
            },
            |action| matches!(action, BookingAction::PaymentDispatched { .. }),
            config.payment_timeout,
        )
        .await?;

    let token = store
        .state(|s| s.payments.intent().map(|intent| intent.correlation_token))
        .await
        .ok_or_else(|| anyhow::anyhow!("no payment intent"))?;
    println!("   Correlation token: {token}");

    // The provider's callback, delivered by the host
    store
        .send(BookingAction::ReconcilePayment {
            token,
            outcome: ProviderOutcome::Succeeded,
        })
        .await?;

    let status = store.state(BookingState::booking_status).await;
    println!("   Status:            {}\n", status.map_or_else(|| "unknown".to_string(), |s| s.to_string()));

    if let Some(metrics) = recorder.render() {
        println!("Metrics:\n{metrics}");
    }

    println!("============================================");
    println!("   Demo complete");
    println!("============================================\n");
    Ok(())
}
