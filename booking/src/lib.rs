//! Booking orchestration and pricing engine.
//!
//! Drives a single booking from a catalog listing to a paid reservation:
//!
//! ```text
//! Start ─▶ catalog lookup ─▶ CollectingDetails ─▶ CollectingContact
//!                                                       │ Advance (signed in)
//!                                                       ▼
//!                               freeze snapshot ─▶ AwaitingPayment ─▶ submit
//!                                                                       │
//!                                        Submitted (booking number) ◀───┘
//!                                                 │
//!                              payment intent ─▶ provider callback ─▶ paid / payment_failed
//! ```
//!
//! # Modules
//!
//! - [`pricing`]: deterministic breakdown (base, taxes, discount, total)
//! - [`roster`]: passengers, attendees or guests and their seats
//! - [`catalog`]: offering lookup and normalisation
//! - [`submission`]: booking creation against the booking service
//! - [`payment`]: payment handoff and callback reconciliation
//! - [`wizard`]: the reducer tying it together
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use waypoint_booking::catalog::HttpCatalogClient;
//! use waypoint_booking::config::BookingConfig;
//! use waypoint_booking::payment::HttpPaymentGateway;
//! use waypoint_booking::submission::HttpSubmissionClient;
//! use waypoint_booking::types::ServiceId;
//! use waypoint_booking::wizard::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
//! use waypoint_core::environment::{SystemClock, UuidGenerator};
//! use waypoint_runtime::Store;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BookingConfig::from_env();
//! let env = BookingEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(UuidGenerator),
//!     Arc::new(HttpCatalogClient::from_config(&config)),
//!     Arc::new(HttpSubmissionClient::from_config(&config)),
//!     Arc::new(HttpPaymentGateway::from_config(&config)),
//! )
//! .with_config(config);
//!
//! let store = Store::new(BookingState::new(), BookingReducer::new(), env);
//! store
//!     .send(BookingAction::Start {
//!         service_id: ServiceId::new("ktm-pkr-0700"),
//!         identity: None,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod payment;
pub mod pricing;
pub mod roster;
pub mod session;
pub mod submission;
pub mod types;
pub mod wizard;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use config::BookingConfig;
pub use error::{BookingError, ErrorSurface, FieldError};
pub use pricing::{Promotion, PricingOptions, compute_pricing};
pub use session::{Identity, Redirect};
pub use types::{BookingRecord, BookingStatus, DraftSnapshot, PricingBreakdown, ServiceOffering};
pub use wizard::{BookingAction, BookingEnvironment, BookingReducer, BookingState, Step};
