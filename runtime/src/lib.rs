//! # Waypoint Runtime
//!
//! Runtime implementation for the Waypoint booking engine.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Event Loop**: Manages the action → reducer → effects → action feedback loop
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_runtime::Store;
//!
//! let store = Store::new(BookingState::default(), BookingReducer::new(), environment);
//!
//! // Send an action and wait until its effect tree settles
//! let mut handle = store.send(BookingAction::AddLineItem).await?;
//! handle.wait().await;
//!
//! // Read state
//! let total = store.state(|s| s.draft.as_ref().map(|d| d.pricing().total)).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for effects to complete.
/// Tracking is cascading: effects spawned by actions that were themselves
/// produced by tracked effects count towards the same handle, so `wait()`
/// returns once the whole effect tree has settled.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and its internal tracking context
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running for this handle
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracking context is gone, nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{DecrementGuard, EffectHandle, EffectTracking, StoreError, metrics as names};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{RwLock, broadcast};
    use waypoint_core::{SmallVec, effect::Effect, reducer::Reducer};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; every reduction holds the write lock, so
    ///    actions are applied one at a time)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        /// Every action produced by an effect is broadcast here so callers can
        /// await asynchronous outcomes (submission results, payment callbacks).
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast capacity defaults to 64.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a new store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// The reducer runs to completion under the write lock before this
        /// method returns, so any state read afterwards observes the action.
        /// Effects are spawned onto the tokio runtime; the returned
        /// [`EffectHandle`] can be awaited until they (and any actions they
        /// feed back) have settled.
        ///
        /// # Errors
        ///
        /// Currently infallible; the `Result` keeps room for admission control.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            let (handle, tracking) = EffectHandle::new();
            self.send_tracked(action, tracking).await;
            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast BEFORE sending, so a result
        /// produced immediately cannot be missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Initial actions passed to [`Store::send`] are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let step = store.state(|s| s.step()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Reduce one action and execute its effects under the given tracking
        async fn send_tracked(&self, action: A, tracking: EffectTracking) {
            let effects = self.reduce(action).await;
            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }
        }

        /// Feed an effect-produced action back into the store
        ///
        /// Broadcast happens after the reducer has run, so observers woken by
        /// the action read state that already reflects it.
        async fn feed_back(&self, action: A, tracking: EffectTracking) {
            let effects = self.reduce(action.clone()).await;
            let _ = self.action_broadcast.send(action);
            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }
        }

        async fn reduce(&self, action: A) -> SmallVec<[Effect<A>; 4]> {
            tracing::debug!(?action, "Processing action");
            metrics::counter!(names::STORE_COMMANDS_TOTAL).increment(1);

            let mut state = self.state.write().await;
            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut *state, action, &self.environment);
            metrics::histogram!(names::STORE_REDUCER_DURATION).record(start.elapsed().as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        }

        /// Execute an effect with tracking
        ///
        /// **Effect execution failures**: Log and continue. A panicking effect
        /// task is reported by tokio; the [`DecrementGuard`] keeps the
        /// counter consistent.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned tasks
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!(names::STORE_EFFECTS_EXECUTED, "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!(names::STORE_EFFECTS_EXECUTED, "type" => "future").increment(1);
                    tracking.increment();

                    let store = self.clone();
                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, feeding back");
                            store.feed_back(action, tracking).await;
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!(names::STORE_EFFECTS_EXECUTED, "type" => "delay").increment(1);
                    tracking.increment();

                    let store = self.clone();
                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());

                        tokio::time::sleep(duration).await;
                        tracing::trace!(?duration, "Effect::Delay elapsed, sending action");
                        store.feed_back(*action, tracking).await;
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!(names::STORE_EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!(names::STORE_EFFECTS_EXECUTED, "type" => "sequential").increment(1);
                    tracking.increment();

                    let store = self.clone();
                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());

                        for effect in effects {
                            // Each step gets its own handle so the next one starts
                            // only after the previous step's tree has settled
                            let (mut step, step_tracking) = EffectHandle::new();
                            store.execute_effect(effect, step_tracking);
                            step.wait().await;
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use waypoint_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        Decrement,
        ProduceEffect,
        ProduceDelayedAction,
        ProduceParallelEffects,
        ProduceSequentialEffects,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TestAction::Increment)
                    }))]
                },
                TestAction::ProduceDelayedAction => {
                    smallvec![Effect::Delay {
                        duration: Duration::from_millis(10),
                        action: Box::new(TestAction::Increment),
                    }]
                },
                TestAction::ProduceParallelEffects => {
                    smallvec![Effect::Parallel(vec![
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    ])]
                },
                TestAction::ProduceSequentialEffects => {
                    smallvec![Effect::Sequential(vec![
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Decrement) })),
                    ])]
                },
            }
        }
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let _ = store.send(TestAction::Increment).await;
        let value = store.state(|s| s.value).await;
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_future_effect_feeds_back() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_effect() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let mut handle = store.send(TestAction::ProduceDelayedAction).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 0);

        handle.wait().await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_parallel_effects() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let mut handle = store.send(TestAction::ProduceParallelEffects).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_sequential_effects() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let mut handle = store.send(TestAction::ProduceSequentialEffects).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_effect_result() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let result = store
            .send_and_wait_for(
                TestAction::ProduceEffect,
                |a| matches!(a, TestAction::Increment),
                Duration::from_secs(1),
            )
            .await;

        assert!(matches!(result, Ok(TestAction::Increment)));
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = Store::new(TestState { value: 0 }, TestReducer, TestEnv);

        let result = store
            .send_and_wait_for(
                TestAction::Increment,
                |a| matches!(a, TestAction::Decrement),
                Duration::from_millis(20),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn test_completed_handle() {
        let mut handle = EffectHandle::completed();
        assert!(handle.wait_with_timeout(Duration::from_millis(10)).await.is_ok());
    }
}
