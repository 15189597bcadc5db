//! Pricing calculator.
//!
//! A pure function from an offering, a quantity and the draft's pricing
//! options to an itemised breakdown. No clock, no randomness: identical inputs
//! always produce identical output.
//!
//! Order of operations:
//!
//! 1. `base = base_price × quantity`, multiplied by the offering's urgency
//!    multiplier when the draft is urgent
//! 2. one tax line per rule: `base × rate / 100`
//! 3. discount on the taxed subtotal
//! 4. `total = base + taxes − discount`, floored at zero
//!
//! Every amount is rounded to two places with banker's rounding.

use crate::error::PricingDataError;
use crate::types::{PricingBreakdown, ServiceOffering, TaxLine};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Promotional rule applied to the taxed subtotal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Promotion {
    /// Fixed amount off
    Flat(Decimal),
    /// Percentage of the taxed subtotal, `0..=100`
    Percent(Decimal),
}

/// Draft options that affect price
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOptions {
    /// Express / urgent handling
    pub urgent: bool,
    /// Promotional discount
    pub promotion: Option<Promotion>,
}

/// Round a money amount to 2 places, ties to even.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Largest base price a catalog offering may carry
pub const MAX_BASE_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest cargo weight or volume a draft may carry
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Price a draft.
///
/// `quantity` is the roster length for seat and tour kinds and the weight or
/// volume for cargo. Arithmetic overflow never panics: the breakdown comes
/// back zeroed with [`PricingDataError::Overflow`] attached.
#[must_use]
pub fn compute_pricing(
    offering: &ServiceOffering,
    quantity: Decimal,
    options: &PricingOptions,
) -> PricingBreakdown {
    checked_pricing(offering, quantity, options).unwrap_or_else(|| {
        tracing::warn!(
            service_id = %offering.id(),
            %quantity,
            urgent = options.urgent,
            "Pricing overflowed, breakdown zeroed"
        );
        PricingBreakdown {
            currency: offering.currency().to_string(),
            base: Decimal::ZERO,
            taxes: offering
                .tax_rules()
                .iter()
                .map(|rule| TaxLine {
                    name: rule.name.clone(),
                    rate_percent: rule.rate_percent,
                    amount: Decimal::ZERO,
                })
                .collect(),
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            data_error: Some(PricingDataError::Overflow),
        }
    })
}

fn checked_pricing(
    offering: &ServiceOffering,
    quantity: Decimal,
    options: &PricingOptions,
) -> Option<PricingBreakdown> {
    let mut base = offering.base_price().checked_mul(quantity)?;
    if options.urgent {
        base = base.checked_mul(offering.urgency_multiplier())?;
    }
    let base = round_money(base);

    let taxes = offering
        .tax_rules()
        .iter()
        .map(|rule| {
            let amount = base.checked_mul(rule.rate_percent)?.checked_div(Decimal::ONE_HUNDRED)?;
            Some(TaxLine {
                name: rule.name.clone(),
                rate_percent: rule.rate_percent,
                amount: round_money(amount),
            })
        })
        .collect::<Option<Vec<TaxLine>>>()?;

    let subtotal = taxes
        .iter()
        .try_fold(base, |sum, line| sum.checked_add(line.amount))?;

    let discount = match options.promotion {
        None => Decimal::ZERO,
        Some(Promotion::Flat(amount)) => round_money(amount.max(Decimal::ZERO)),
        Some(Promotion::Percent(rate)) => round_money(
            subtotal
                .checked_mul(rate.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))?
                .checked_div(Decimal::ONE_HUNDRED)?,
        ),
    };

    let unclamped = subtotal.checked_sub(discount)?;
    let (total, data_error) = if unclamped.is_sign_negative() && !unclamped.is_zero() {
        tracing::warn!(
            service_id = %offering.id(),
            %unclamped,
            "Discount exceeds subtotal, flooring total at zero"
        );
        (Decimal::ZERO, Some(PricingDataError::NegativeTotal { unclamped }))
    } else {
        (unclamped, None)
    };

    Some(PricingBreakdown {
        currency: offering.currency().to_string(),
        base,
        taxes,
        discount,
        total,
        data_error,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::OfferingDto;
    use crate::types::ServiceKind;
    use rust_decimal_macros::dec;

    fn offering(kind: ServiceKind, base_price: Decimal) -> ServiceOffering {
        ServiceOffering::try_from(OfferingDto::new("svc", kind, base_price, "NPR").with_tax("VAT", dec!(13))).unwrap()
    }

    #[test]
    fn two_passengers_with_vat() {
        let pricing = compute_pricing(
            &offering(ServiceKind::SeatTransport, dec!(800)),
            dec!(2),
            &PricingOptions::default(),
        );

        assert_eq!(pricing.base, dec!(1600));
        assert_eq!(pricing.taxes.len(), 1);
        assert_eq!(pricing.taxes[0].amount, dec!(208));
        assert_eq!(pricing.discount, Decimal::ZERO);
        assert_eq!(pricing.total, dec!(1808));
        assert!(pricing.data_error.is_none());
    }

    #[test]
    fn urgency_applies_before_tax() {
        let options = PricingOptions {
            urgent: true,
            promotion: None,
        };
        let pricing = compute_pricing(&offering(ServiceKind::Cargo, dec!(10000)), dec!(2.5), &options);

        assert_eq!(pricing.base, dec!(37500));
        assert_eq!(pricing.taxes[0].amount, dec!(4875));
        assert_eq!(pricing.total, dec!(42375));
    }

    #[test]
    fn zero_rate_taxes_are_listed() {
        let offering = ServiceOffering::try_from(
            OfferingDto::new("tour", ServiceKind::Tour, dec!(100), "USD")
                .with_tax("VAT", dec!(13))
                .with_tax("Tourism levy", dec!(0)),
        )
        .unwrap();

        let pricing = compute_pricing(&offering, dec!(3), &PricingOptions::default());

        assert_eq!(pricing.taxes.len(), 2);
        assert_eq!(pricing.taxes[1].name, "Tourism levy");
        assert_eq!(pricing.taxes[1].amount, Decimal::ZERO);
        assert_eq!(pricing.total, dec!(339));
    }

    #[test]
    fn percent_promotion_discounts_taxed_subtotal() {
        let options = PricingOptions {
            urgent: false,
            promotion: Some(Promotion::Percent(dec!(10))),
        };
        let pricing = compute_pricing(&offering(ServiceKind::SeatTransport, dec!(800)), dec!(2), &options);

        assert_eq!(pricing.discount, dec!(180.80));
        assert_eq!(pricing.total, dec!(1627.20));
    }

    #[test]
    fn oversized_discount_floors_total_and_reports_it() {
        let options = PricingOptions {
            urgent: false,
            promotion: Some(Promotion::Flat(dec!(5000))),
        };
        let pricing = compute_pricing(&offering(ServiceKind::SeatTransport, dec!(800)), dec!(1), &options);

        assert_eq!(pricing.total, Decimal::ZERO);
        assert_eq!(
            pricing.data_error,
            Some(PricingDataError::NegativeTotal {
                unclamped: dec!(-4096)
            })
        );
    }

    #[test]
    fn exact_discount_is_not_a_data_error() {
        let options = PricingOptions {
            urgent: false,
            promotion: Some(Promotion::Flat(dec!(904))),
        };
        let pricing = compute_pricing(&offering(ServiceKind::SeatTransport, dec!(800)), dec!(1), &options);

        assert_eq!(pricing.total, Decimal::ZERO);
        assert!(pricing.data_error.is_none());
    }

    #[test]
    fn overflow_is_reported_instead_of_panicking() {
        let pricing = compute_pricing(
            &offering(ServiceKind::Cargo, dec!(10000)),
            Decimal::MAX,
            &PricingOptions::default(),
        );

        assert_eq!(pricing.data_error, Some(PricingDataError::Overflow));
        assert_eq!(pricing.total, Decimal::ZERO);
        assert_eq!(pricing.taxes.len(), 1);
        assert_eq!(pricing.taxes[0].amount, Decimal::ZERO);
    }

    #[test]
    fn largest_accepted_inputs_price_without_overflow() {
        let options = PricingOptions {
            urgent: true,
            promotion: Some(Promotion::Percent(dec!(5))),
        };
        let pricing = compute_pricing(&offering(ServiceKind::Cargo, MAX_BASE_PRICE), MAX_QUANTITY, &options);

        assert!(pricing.data_error.is_none());
        assert!(pricing.total > Decimal::ZERO);
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
        assert_eq!(round_money(dec!(1.234)), dec!(1.23));
    }
}
