//! Domain types for the booking core.
//!
//! Value objects, the normalised service offering, the mutable booking draft,
//! the frozen snapshot handed to submission and the server-confirmed record.

use crate::error::{BookingError, OfferingError, PricingDataError};
use crate::pricing::{self, PricingOptions};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Catalog identifier of a service listing
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Wrap a catalog identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable booking number issued by the booking service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingNumber(String);

impl BookingNumber {
    /// Wrap a booking number
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the booking number as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-generated token matching a payment outcome to its initiation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    /// Create a `CorrelationToken` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one submission attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Create an `AttemptId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Service Offering
// ============================================================================

/// Kind of service, deciding how a draft carries its load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Seat-based transport with a roster of named passengers
    SeatTransport,
    /// Weight or volume based cargo with a single quantity
    Cargo,
    /// Package tour priced per group member
    Tour,
}

impl ServiceKind {
    /// Whether drafts of this kind carry a roster of line items
    #[must_use]
    pub const fn has_roster(self) -> bool {
        matches!(self, Self::SeatTransport | Self::Tour)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeatTransport => write!(f, "seat-transport"),
            Self::Cargo => write!(f, "cargo"),
            Self::Tour => write!(f, "tour"),
        }
    }
}

/// A named tax applied to the base amount
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    /// Display name, e.g. "VAT"
    pub name: String,
    /// Rate as a percentage, `0..=100`
    pub rate_percent: Decimal,
}

/// Schedule choices published by an offering.
///
/// An empty list means the field does not apply to this service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOptions {
    /// Departure or pickup times
    pub time_slots: Vec<String>,
    /// Boarding points
    pub boarding_points: Vec<String>,
    /// Dropping points
    pub dropping_points: Vec<String>,
    /// Assignable seat or slot identifiers
    pub slots: Vec<String>,
}

/// A normalised, read-only service definition.
///
/// Only built through [`ServiceOffering::try_from`] on a catalog DTO, so every
/// field is populated and validated once at fetch time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceOffering {
    pub(crate) id: ServiceId,
    pub(crate) kind: ServiceKind,
    pub(crate) base_price: Decimal,
    pub(crate) currency: String,
    pub(crate) tax_rules: Vec<TaxRule>,
    pub(crate) schedule: ScheduleOptions,
    pub(crate) max_roster_size: usize,
    pub(crate) urgency_multiplier: Decimal,
}

impl ServiceOffering {
    /// Catalog identifier
    #[must_use]
    pub const fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Service kind
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Price per passenger, group member or cargo unit
    #[must_use]
    pub const fn base_price(&self) -> Decimal {
        self.base_price
    }

    /// ISO 4217 currency code
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Tax rules in display order
    #[must_use]
    pub fn tax_rules(&self) -> &[TaxRule] {
        &self.tax_rules
    }

    /// Published schedule options
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleOptions {
        &self.schedule
    }

    /// Largest roster a single booking may carry (1 for cargo)
    #[must_use]
    pub const fn max_roster_size(&self) -> usize {
        self.max_roster_size
    }

    /// Multiplier applied to the base amount for urgent bookings
    #[must_use]
    pub const fn urgency_multiplier(&self) -> Decimal {
        self.urgency_multiplier
    }

    pub(crate) fn validate(&self) -> Result<(), OfferingError> {
        if self.id.as_str().trim().is_empty() {
            return Err(OfferingError::MissingId);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(OfferingError::InvalidCurrency(self.currency.clone()));
        }
        if self.base_price.is_sign_negative() {
            return Err(OfferingError::NegativeBasePrice(self.base_price));
        }
        if self.base_price > pricing::MAX_BASE_PRICE {
            return Err(OfferingError::BasePriceTooLarge(self.base_price));
        }
        if let Some(rule) = self
            .tax_rules
            .iter()
            .find(|rule| rule.rate_percent < Decimal::ZERO || rule.rate_percent > Decimal::ONE_HUNDRED)
        {
            return Err(OfferingError::TaxRateOutOfRange {
                name: rule.name.clone(),
                rate: rule.rate_percent,
            });
        }
        if self.max_roster_size == 0 {
            return Err(OfferingError::InvalidRosterSize);
        }
        if self.urgency_multiplier < Decimal::ONE {
            return Err(OfferingError::InvalidUrgencyMultiplier(self.urgency_multiplier));
        }
        Ok(())
    }
}

// ============================================================================
// Draft contents
// ============================================================================

/// Fare category of a passenger
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerCategory {
    /// Adult
    #[default]
    Adult,
    /// Child
    Child,
    /// Senior citizen
    Senior,
    /// Infant
    Infant,
}

/// One passenger or group member
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Full name
    pub name: String,
    /// Age in years
    pub age: Option<u8>,
    /// Fare category
    pub category: PassengerCategory,
    /// Assigned seat or slot
    pub slot: Option<String>,
}

/// What a draft is priced on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Load {
    /// Named line items (seat transport, tours); never empty
    Roster(Vec<LineItem>),
    /// Weight or volume (cargo)
    Quantity(Decimal),
}

impl Load {
    /// Quantity fed to the pricing calculator
    #[must_use]
    pub fn pricing_quantity(&self) -> Decimal {
        match self {
            Self::Roster(items) => Decimal::from(items.len()),
            Self::Quantity(quantity) => *quantity,
        }
    }
}

/// Contact details for the booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Contact name
    pub name: String,
    /// Primary phone
    pub phone: String,
    /// Email address
    pub email: String,
    /// Alternate phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_phone: Option<String>,
}

/// Travel date and, where published, time slot and route points
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSelection {
    /// Travel or pickup date
    pub date: Option<NaiveDate>,
    /// Selected time slot
    pub time_slot: Option<String>,
    /// Boarding point
    pub boarding_point: Option<String>,
    /// Dropping point
    pub dropping_point: Option<String>,
}

// ============================================================================
// Pricing Breakdown
// ============================================================================

/// One tax entry of a breakdown
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLine {
    /// Tax name
    pub name: String,
    /// Rate as a percentage
    pub rate_percent: Decimal,
    /// Amount charged
    pub amount: Decimal,
}

/// Itemised price of a draft.
///
/// Produced only by [`pricing::compute_pricing`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    /// Currency of every amount
    pub currency: String,
    /// Base amount after any urgency multiplier
    pub base: Decimal,
    /// One line per tax rule, including zero rates
    pub taxes: Vec<TaxLine>,
    /// Discount applied to the taxed subtotal
    pub discount: Decimal,
    /// Amount payable, never negative
    pub total: Decimal,
    /// Set when the total had to be floored
    #[serde(skip)]
    pub data_error: Option<PricingDataError>,
}

impl PricingBreakdown {
    /// Sum of all tax lines
    #[must_use]
    pub fn tax_total(&self) -> Decimal {
        self.taxes.iter().map(|line| line.amount).sum()
    }

    /// Base plus taxes, before discount
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.base + self.tax_total()
    }
}

// ============================================================================
// Booking Draft
// ============================================================================

/// The mutable booking being assembled by the wizard.
///
/// The breakdown is private and replaced wholesale by [`BookingDraft::reprice`]
/// whenever the load or pricing options change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingDraft {
    pub(crate) service_id: ServiceId,
    pub(crate) kind: ServiceKind,
    pub(crate) schedule: ScheduleSelection,
    pub(crate) load: Load,
    pub(crate) contact: Contact,
    pub(crate) notes: String,
    pub(crate) options: PricingOptions,
    pricing: PricingBreakdown,
}

impl BookingDraft {
    /// Seed a draft from an offering: one blank line item, or quantity 1 for cargo
    #[must_use]
    pub fn seed(offering: &ServiceOffering) -> Self {
        let load = if offering.kind.has_roster() {
            Load::Roster(vec![LineItem::default()])
        } else {
            Load::Quantity(Decimal::ONE)
        };
        let options = PricingOptions::default();
        let pricing = pricing::compute_pricing(offering, load.pricing_quantity(), &options);

        Self {
            service_id: offering.id.clone(),
            kind: offering.kind,
            schedule: ScheduleSelection::default(),
            load,
            contact: Contact::default(),
            notes: String::new(),
            options,
            pricing,
        }
    }

    /// Recompute the breakdown from the current load and options
    pub(crate) fn reprice(&mut self, offering: &ServiceOffering) {
        self.pricing = pricing::compute_pricing(offering, self.load.pricing_quantity(), &self.options);
    }

    /// Service this draft books
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Service kind
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Schedule selection
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleSelection {
        &self.schedule
    }

    /// Roster or quantity
    #[must_use]
    pub const fn load(&self) -> &Load {
        &self.load
    }

    /// Roster line items; empty for cargo
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        match &self.load {
            Load::Roster(items) => items,
            Load::Quantity(_) => &[],
        }
    }

    /// Cargo quantity; `None` for roster kinds
    #[must_use]
    pub const fn cargo_quantity(&self) -> Option<Decimal> {
        match &self.load {
            Load::Quantity(quantity) => Some(*quantity),
            Load::Roster(_) => None,
        }
    }

    /// Contact record
    #[must_use]
    pub const fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Notes and special requirements
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Urgency and promotion options
    #[must_use]
    pub const fn options(&self) -> &PricingOptions {
        &self.options
    }

    /// Current breakdown, always consistent with load and options
    #[must_use]
    pub const fn pricing(&self) -> &PricingBreakdown {
        &self.pricing
    }
}

// ============================================================================
// Draft Snapshot
// ============================================================================

/// Immutable copy of a draft taken when entering `AwaitingPayment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    service_id: ServiceId,
    kind: ServiceKind,
    schedule: ScheduleSelection,
    load: Load,
    contact: Contact,
    notes: String,
    pricing: PricingBreakdown,
    frozen_at: DateTime<Utc>,
}

impl DraftSnapshot {
    /// Freeze a draft, re-pricing it from scratch first.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] if the draft belongs to a
    /// different offering or its displayed price differs from a fresh
    /// recomputation.
    pub fn freeze(
        draft: &BookingDraft,
        offering: &ServiceOffering,
        frozen_at: DateTime<Utc>,
    ) -> Result<Self, BookingError> {
        if draft.service_id != offering.id {
            return Err(BookingError::InvalidTransition {
                reason: format!("draft is for {} but offering is {}", draft.service_id, offering.id),
            });
        }

        let fresh = pricing::compute_pricing(offering, draft.load.pricing_quantity(), &draft.options);
        if fresh.data_error == Some(PricingDataError::Overflow) {
            return Err(BookingError::field("pricing.total", "price could not be calculated"));
        }
        if fresh != draft.pricing {
            return Err(BookingError::InvalidTransition {
                reason: "displayed price is out of date".to_string(),
            });
        }

        Ok(Self {
            service_id: draft.service_id.clone(),
            kind: draft.kind,
            schedule: draft.schedule.clone(),
            load: draft.load.clone(),
            contact: draft.contact.clone(),
            notes: draft.notes.clone(),
            pricing: fresh,
            frozen_at,
        })
    }

    /// Service booked
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Service kind
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Schedule at freeze time
    #[must_use]
    pub const fn schedule(&self) -> &ScheduleSelection {
        &self.schedule
    }

    /// Roster or quantity at freeze time
    #[must_use]
    pub const fn load(&self) -> &Load {
        &self.load
    }

    /// Contact at freeze time
    #[must_use]
    pub const fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Notes at freeze time
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Breakdown the user approved
    #[must_use]
    pub const fn pricing(&self) -> &PricingBreakdown {
        &self.pricing
    }

    /// When the draft was frozen
    #[must_use]
    pub const fn frozen_at(&self) -> DateTime<Utc> {
        self.frozen_at
    }
}

// ============================================================================
// Booking Record
// ============================================================================

/// Server-side status of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, no payment attempted yet
    Created,
    /// A payment is pending with the provider
    AwaitingPayment,
    /// Paid (terminal)
    Paid,
    /// Last payment attempt failed; may be retried
    PaymentFailed,
    /// Cancelled (terminal)
    Cancelled,
}

impl BookingStatus {
    /// Whether no further transition is defined
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AwaitingPayment => write!(f, "awaiting_payment"),
            Self::Paid => write!(f, "paid"),
            Self::PaymentFailed => write!(f, "payment_failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A booking confirmed by the booking service.
///
/// The snapshot never changes after creation; payment events change status only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRecord {
    booking_number: BookingNumber,
    status: BookingStatus,
    snapshot: DraftSnapshot,
    created_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Create a record from a confirmed submission
    #[must_use]
    pub const fn new(
        booking_number: BookingNumber,
        status: BookingStatus,
        snapshot: DraftSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_number,
            status,
            snapshot,
            created_at,
        }
    }

    /// Booking number
    #[must_use]
    pub const fn booking_number(&self) -> &BookingNumber {
        &self.booking_number
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> BookingStatus {
        self.status
    }

    /// Draft and pricing as submitted
    #[must_use]
    pub const fn snapshot(&self) -> &DraftSnapshot {
        &self.snapshot
    }

    /// Amount the user approved at submission
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.snapshot.pricing.total
    }

    /// Currency of the total
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.snapshot.pricing.currency
    }

    /// When the record was created
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) const fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
    }
}

// ============================================================================
// Payment Intent
// ============================================================================

/// Outcome reported by a payment provider callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderOutcome {
    /// Payment captured
    Succeeded,
    /// Payment declined or abandoned
    Failed,
}

/// State of a payment intent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Waiting for the provider
    Pending,
    /// Provider confirmed payment
    Succeeded,
    /// Provider declined, dispatch failed or timed out
    Failed,
}

impl From<ProviderOutcome> for PaymentOutcome {
    fn from(outcome: ProviderOutcome) -> Self {
        match outcome {
            ProviderOutcome::Succeeded => Self::Succeeded,
            ProviderOutcome::Failed => Self::Failed,
        }
    }
}

/// One attempt to collect payment for a booking
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Selected provider
    pub provider_id: String,
    /// Amount copied from the record's total
    pub amount: Decimal,
    /// Currency of the amount
    pub currency: String,
    /// Token matching the provider callback
    pub correlation_token: CorrelationToken,
    /// Current outcome
    pub outcome: PaymentOutcome,
    /// When the attempt started
    pub initiated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::OfferingDto;
    use rust_decimal_macros::dec;

    fn bus() -> ServiceOffering {
        ServiceOffering::try_from(
            OfferingDto::new("ktm-pkr", ServiceKind::SeatTransport, dec!(800), "NPR").with_tax("VAT", dec!(13)),
        )
        .unwrap()
    }

    #[test]
    fn seeded_roster_draft_has_one_blank_passenger() {
        let draft = BookingDraft::seed(&bus());

        assert_eq!(draft.line_items().len(), 1);
        assert!(draft.line_items()[0].name.is_empty());
        assert_eq!(draft.pricing().total, dec!(904));
    }

    #[test]
    fn seeded_cargo_draft_has_unit_quantity() {
        let offering =
            ServiceOffering::try_from(OfferingDto::new("truck", ServiceKind::Cargo, dec!(10000), "NPR")).unwrap();
        let draft = BookingDraft::seed(&offering);

        assert_eq!(draft.cargo_quantity(), Some(Decimal::ONE));
        assert!(draft.line_items().is_empty());
    }

    #[test]
    fn snapshot_is_independent_of_later_draft_edits() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        let snapshot = DraftSnapshot::freeze(&draft, &offering, Utc::now()).unwrap();

        draft.notes = "window seat".to_string();
        draft.load = Load::Roster(vec![LineItem::default(), LineItem::default()]);
        draft.reprice(&offering);

        assert_eq!(snapshot.notes(), "");
        assert_eq!(snapshot.pricing().total, dec!(904));
        assert_eq!(draft.pricing().total, dec!(1808));
    }

    #[test]
    fn freeze_rejects_stale_pricing() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        draft.options.urgent = true;

        let result = DraftSnapshot::freeze(&draft, &offering, Utc::now());

        assert!(matches!(result, Err(BookingError::InvalidTransition { .. })));
    }

    #[test]
    fn freeze_rejects_overflowed_pricing() {
        let offering = ServiceOffering::try_from(
            OfferingDto::new("truck", ServiceKind::Cargo, dec!(1000000000), "NPR")
                .with_urgency_multiplier(Decimal::MAX),
        )
        .unwrap();
        let mut draft = BookingDraft::seed(&offering);
        draft.options.urgent = true;
        draft.reprice(&offering);
        assert_eq!(draft.pricing().data_error, Some(PricingDataError::Overflow));

        let result = DraftSnapshot::freeze(&draft, &offering, Utc::now());

        assert!(matches!(result, Err(BookingError::Validation { .. })));
    }

    #[test]
    fn terminal_statuses() {
        assert!(BookingStatus::Paid.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::PaymentFailed.is_terminal());
        assert_eq!(BookingStatus::AwaitingPayment.to_string(), "awaiting_payment");
    }
}
