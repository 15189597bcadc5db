//! In-memory collaborators for development and testing.
//!
//! Each double records what it was asked and answers from a script, falling
//! back to success once the script runs out.

use crate::catalog::{CatalogClient, CatalogError, OfferingDto};
use crate::error::FieldError;
use crate::payment::{GatewayError, GatewayResult, PaymentGateway, PaymentRequest};
use crate::session::Identity;
use crate::submission::{SubmissionClient, SubmissionFailure, SubmissionReceipt};
use crate::types::{BookingNumber, BookingStatus, DraftSnapshot, ServiceId, ServiceOffering};
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog backed by a map of offering documents
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    offerings: Mutex<HashMap<String, OfferingDto>>,
    outages: AtomicUsize,
    lookups: AtomicUsize,
}

impl InMemoryCatalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an offering document
    #[must_use]
    pub fn with_offering(self, offering: OfferingDto) -> Self {
        self.insert(offering);
        self
    }

    /// Add or replace an offering document
    pub fn insert(&self, offering: OfferingDto) {
        lock(&self.offerings).insert(offering.id.clone(), offering);
    }

    /// Fail the next `count` lookups with a transport error
    pub fn fail_next(&self, count: usize) {
        self.outages.store(count, Ordering::SeqCst);
    }

    /// Number of lookups served, failed ones included
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn lookup(&self, service_id: ServiceId) -> Result<ServiceOffering, CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let outage = self
            .outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if outage {
            return Err(CatalogError::Transport("connection refused".to_string()));
        }

        let dto = lock(&self.offerings)
            .get(service_id.as_str())
            .cloned()
            .ok_or(CatalogError::NotFound(service_id))?;
        Ok(ServiceOffering::try_from(dto)?)
    }
}

impl CatalogClient for InMemoryCatalog {
    fn fetch(&self, service_id: ServiceId) -> BoxFuture<'static, Result<ServiceOffering, CatalogError>> {
        future::ready(self.lookup(service_id)).boxed()
    }
}

// ============================================================================
// Booking service
// ============================================================================

/// Scripted answer from [`InMemorySubmissionClient`]
#[derive(Clone, Debug)]
pub enum SubmissionScript {
    /// Create the booking
    Accept,
    /// Refuse with field errors
    Reject(Vec<FieldError>),
    /// Refuse the access token
    Unauthenticated,
    /// Fail in transport
    Transport(String),
    /// Never answer
    Hang,
}

/// Booking service that issues sequential booking numbers
#[derive(Debug)]
pub struct InMemorySubmissionClient {
    script: Mutex<VecDeque<SubmissionScript>>,
    received: Mutex<Vec<(DraftSnapshot, Identity)>>,
    next_number: AtomicU64,
    latency: Duration,
}

impl Default for InMemorySubmissionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySubmissionClient {
    /// Creates a client that accepts every submission, numbering from `WP-1001`
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
            next_number: AtomicU64::new(1001),
            latency: Duration::ZERO,
        }
    }

    /// Delay every answer
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue an answer for a future submission
    pub fn push(&self, answer: SubmissionScript) {
        lock(&self.script).push_back(answer);
    }

    /// Snapshots received, in order
    #[must_use]
    pub fn submissions(&self) -> Vec<DraftSnapshot> {
        lock(&self.received).iter().map(|(snapshot, _)| snapshot.clone()).collect()
    }

    /// Identities that submitted, in order
    #[must_use]
    pub fn callers(&self) -> Vec<String> {
        lock(&self.received)
            .iter()
            .map(|(_, identity)| identity.user_id.clone())
            .collect()
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn answer(&self) -> Option<Result<SubmissionReceipt, SubmissionFailure>> {
        let answer = lock(&self.script).pop_front().unwrap_or(SubmissionScript::Accept);
        match answer {
            SubmissionScript::Accept => {
                let number = self.next_number.fetch_add(1, Ordering::SeqCst);
                Some(Ok(SubmissionReceipt {
                    booking_number: BookingNumber::new(format!("WP-{number}")),
                    status: BookingStatus::Created,
                }))
            },
            SubmissionScript::Reject(errors) => Some(Err(SubmissionFailure::Rejected { errors })),
            SubmissionScript::Unauthenticated => Some(Err(SubmissionFailure::Unauthenticated)),
            SubmissionScript::Transport(reason) => Some(Err(SubmissionFailure::Transport { reason })),
            SubmissionScript::Hang => None,
        }
    }
}

impl SubmissionClient for InMemorySubmissionClient {
    fn submit(
        &self,
        snapshot: DraftSnapshot,
        identity: Identity,
    ) -> BoxFuture<'static, Result<SubmissionReceipt, SubmissionFailure>> {
        lock(&self.received).push((snapshot, identity));
        let answer = self.answer();
        let latency = self.latency;

        async move {
            match answer {
                Some(result) => {
                    tokio::time::sleep(latency).await;
                    result
                },
                None => future::pending().await,
            }
        }
        .boxed()
    }
}

// ============================================================================
// Payment provider
// ============================================================================

/// Scripted answer from [`InMemoryPaymentGateway`]
#[derive(Clone, Debug)]
pub enum GatewayScript {
    /// Accept the payment request
    Accept,
    /// Decline it
    Decline(String),
    /// Fail in transport
    Transport(String),
    /// Never answer
    Hang,
}

/// Payment provider that records requests
#[derive(Debug, Default)]
pub struct InMemoryPaymentGateway {
    script: Mutex<VecDeque<GatewayScript>>,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl InMemoryPaymentGateway {
    /// Creates a gateway that accepts every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for a future request
    pub fn push(&self, answer: GatewayScript) {
        lock(&self.script).push_back(answer);
    }

    /// Requests received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<PaymentRequest> {
        lock(&self.requests).clone()
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl PaymentGateway for InMemoryPaymentGateway {
    fn initiate(&self, request: PaymentRequest) -> BoxFuture<'static, GatewayResult<()>> {
        tracing::debug!(
            booking_number = %request.booking_number,
            correlation_token = %request.correlation_token,
            amount = %request.amount,
            "In-memory payment request"
        );
        lock(&self.requests).push(request);

        match lock(&self.script).pop_front().unwrap_or(GatewayScript::Accept) {
            GatewayScript::Accept => future::ready(Ok(())).boxed(),
            GatewayScript::Decline(reason) => future::ready(Err(GatewayError::Declined { reason })).boxed(),
            GatewayScript::Transport(reason) => future::ready(Err(GatewayError::Transport { reason })).boxed(),
            GatewayScript::Hang => future::pending().boxed(),
        }
    }
}
