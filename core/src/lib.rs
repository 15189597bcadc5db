//! # Waypoint Core
//!
//! Core traits and types for the Waypoint booking engine.
//!
//! Business logic is written as reducers: pure functions that take the current
//! state, an action and an environment of injected dependencies, mutate the
//! state in place and return descriptions of the side effects to perform.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (e.g. a booking draft)
//! - **Action**: All possible inputs to a reducer (user intents and async results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for WizardReducer {
//!     type State = WizardState;
//!     type Action = WizardAction;
//!     type Environment = WizardEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut WizardState,
//!         action: WizardAction,
//!         env: &WizardEnvironment,
//!     ) -> SmallVec<[Effect<WizardAction>; 4]> {
//!         match action {
//!             WizardAction::Next => {
//!                 state.step += 1;
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Declarative helpers for building effects
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce at most a handful of effects, so the result is
        /// stored inline in a `SmallVec` without a heap allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All sources of non-determinism (time, identifiers) are abstracted behind
/// traits and injected via the Environment parameter, so reducers stay
/// reproducible under test.
pub mod environment {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Identifier source for client-generated ids (correlation tokens, attempt ids)
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> Uuid;
    }

    /// Production id generator producing random v4 UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self) -> Uuid {
            Uuid::new_v4()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    enum TestAction {
        Tick,
    }

    #[test]
    fn nested_none_effects_are_none() {
        let effect: Effect<TestAction> =
            Effect::merge(vec![Effect::None, Effect::chain(vec![Effect::None])]);
        assert!(effect.is_none());
    }

    #[test]
    fn delay_is_not_none() {
        let effect = Effect::Parallel(vec![
            Effect::None,
            Effect::Delay {
                duration: Duration::from_secs(1),
                action: Box::new(TestAction::Tick),
            },
        ]);
        assert!(!effect.is_none());
    }
}
