//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when a reducer hands async work or a
//! scheduled timeout back to the runtime.

/// Create an `Effect::Future` from an async block body
///
/// The body must evaluate to `Option<Action>`; a `Some` value is fed back
/// into the reducer once the future completes.
///
/// # Example
///
/// ```rust,ignore
/// use waypoint_core::async_effect;
///
/// async_effect! {
///     match catalog.fetch(&service_id).await {
///         Ok(offering) => Some(BookingAction::CatalogLoaded { offering }),
///         Err(error) => Some(BookingAction::CatalogFailed { reason: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use waypoint_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(300),
///     action: BookingAction::PaymentTimedOut { token }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
