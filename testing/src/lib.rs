//! # Waypoint Testing
//!
//! Testing utilities and helpers for the Waypoint booking engine.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_testing::{test_clock, SequentialIds};
//! use waypoint_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_booking_flow() {
//!     let env = test_environment(test_clock(), SequentialIds::new());
//!     let store = Store::new(BookingState::default(), BookingReducer::new(), env);
//!
//!     store.send(BookingAction::AddLineItem).await?;
//!
//!     let travellers = store.state(|s| s.line_items().len()).await;
//!     assert_eq!(travellers, 2);
//! }
//! ```

use chrono::{DateTime, Utc};
use waypoint_core::environment::{Clock, IdGenerator};


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint_testing::mocks::FixedClock;
    /// use waypoint_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable identifiers: `00000000-0000-0000-0000-000000000001`, then `...002`, ...
    ///
    /// ```
    /// use waypoint_testing::mocks::SequentialIds;
    /// use waypoint_core::environment::IdGenerator;
    /// use uuid::Uuid;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id(), Uuid::from_u128(1));
    /// assert_eq!(ids.next_id(), Uuid::from_u128(2));
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Start the sequence at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// How many identifiers have been handed out
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst)) + 1)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequentialIds, test_clock};
pub use reducer_test::{ReducerTest, assertions};
