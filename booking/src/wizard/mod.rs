//! The booking wizard: a reducer over one draft, from catalog lookup to paid booking.
//!
//! - Actions: user intents plus the results of catalog, submission and payment effects
//! - State: current step, draft, frozen snapshot, confirmed record and payment intent
//! - Validation: per-step field checks
//! - Reducer: every transition

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod validation;

pub use actions::BookingAction;
pub use environment::BookingEnvironment;
pub use reducer::BookingReducer;
pub use state::{BookingState, CatalogStatus, Step, SubmissionStatus};
