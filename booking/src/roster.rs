//! Roster manager.
//!
//! Line item operations on a draft. Size changes re-price the draft before
//! returning, so roster and breakdown are never observed out of sync.
//! Rejected operations leave the draft untouched.

use crate::error::BookingError;
use crate::types::{BookingDraft, LineItem, Load, PassengerCategory, ServiceOffering};

/// Smallest roster a seat or tour draft may carry
pub const MIN_ROSTER_SIZE: usize = 1;

fn roster_mut<'a>(draft: &'a mut BookingDraft, operation: &str) -> Result<&'a mut Vec<LineItem>, BookingError> {
    let kind = draft.kind;
    match &mut draft.load {
        Load::Roster(items) => Ok(items),
        Load::Quantity(_) => Err(BookingError::NotApplicable {
            operation: operation.to_string(),
            kind: kind.to_string(),
        }),
    }
}

fn unknown_item(index: usize) -> BookingError {
    BookingError::field(format!("roster[{index}]"), "no such line item")
}

/// Append a blank line item.
///
/// # Errors
///
/// - [`BookingError::CapacityExceeded`] if the roster is already at the offering's limit
/// - [`BookingError::NotApplicable`] for cargo drafts
pub fn add_line_item(draft: &mut BookingDraft, offering: &ServiceOffering) -> Result<(), BookingError> {
    let max = offering.max_roster_size();
    let items = roster_mut(draft, "add line item")?;

    if items.len() >= max {
        return Err(BookingError::CapacityExceeded {
            requested: items.len() + 1,
            min: MIN_ROSTER_SIZE,
            max,
        });
    }

    items.push(LineItem::default());
    draft.reprice(offering);
    Ok(())
}

/// Remove the line item at `index`.
///
/// # Errors
///
/// - [`BookingError::CapacityExceeded`] if only one line item remains
/// - [`BookingError::Validation`] if `index` is out of range
/// - [`BookingError::NotApplicable`] for cargo drafts
pub fn remove_line_item(
    draft: &mut BookingDraft,
    offering: &ServiceOffering,
    index: usize,
) -> Result<(), BookingError> {
    let max = offering.max_roster_size();
    let items = roster_mut(draft, "remove line item")?;

    if items.len() <= MIN_ROSTER_SIZE {
        return Err(BookingError::CapacityExceeded {
            requested: items.len().saturating_sub(1),
            min: MIN_ROSTER_SIZE,
            max,
        });
    }
    if index >= items.len() {
        return Err(unknown_item(index));
    }

    items.remove(index);
    draft.reprice(offering);
    Ok(())
}

/// Replace the identity fields of a line item. Not priced.
///
/// # Errors
///
/// - [`BookingError::Validation`] if `index` is out of range
/// - [`BookingError::NotApplicable`] for cargo drafts
pub fn update_line_item(
    draft: &mut BookingDraft,
    index: usize,
    name: String,
    age: Option<u8>,
    category: PassengerCategory,
) -> Result<(), BookingError> {
    let items = roster_mut(draft, "edit line item")?;
    let item = items.get_mut(index).ok_or_else(|| unknown_item(index))?;

    item.name = name;
    item.age = age;
    item.category = category;
    Ok(())
}

/// Assign a seat or slot to a line item. Not priced.
///
/// # Errors
///
/// - [`BookingError::SlotUnavailable`] if another line item holds the slot, or
///   the offering publishes slots and this is not one of them
/// - [`BookingError::Validation`] if `index` is out of range
/// - [`BookingError::NotApplicable`] for cargo drafts
pub fn assign_slot(
    draft: &mut BookingDraft,
    offering: &ServiceOffering,
    index: usize,
    slot: String,
) -> Result<(), BookingError> {
    let published = &offering.schedule().slots;
    if !published.is_empty() && !published.contains(&slot) {
        return Err(BookingError::SlotUnavailable { slot });
    }

    let items = roster_mut(draft, "assign slot")?;
    if index >= items.len() {
        return Err(unknown_item(index));
    }

    let taken = items
        .iter()
        .enumerate()
        .any(|(i, item)| i != index && item.slot.as_deref() == Some(slot.as_str()));
    if taken {
        return Err(BookingError::SlotUnavailable { slot });
    }

    items[index].slot = Some(slot);
    Ok(())
}

/// Release the slot held by a line item.
///
/// # Errors
///
/// - [`BookingError::Validation`] if `index` is out of range
/// - [`BookingError::NotApplicable`] for cargo drafts
pub fn clear_slot(draft: &mut BookingDraft, index: usize) -> Result<(), BookingError> {
    let items = roster_mut(draft, "clear slot")?;
    let item = items.get_mut(index).ok_or_else(|| unknown_item(index))?;
    item.slot = None;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{OfferingDto, ScheduleOptionsDto};
    use crate::types::ServiceKind;
    use rust_decimal_macros::dec;

    fn bus() -> ServiceOffering {
        ServiceOffering::try_from(
            OfferingDto::new("ktm-pkr", ServiceKind::SeatTransport, dec!(800), "NPR")
                .with_tax("VAT", dec!(13))
                .with_schedule(ScheduleOptionsDto {
                    slots: vec!["A1".into(), "A2".into(), "B1".into()],
                    ..ScheduleOptionsDto::default()
                }),
        )
        .unwrap()
    }

    #[test]
    fn add_and_remove_reprice() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);

        add_line_item(&mut draft, &offering).unwrap();
        assert_eq!(draft.line_items().len(), 2);
        assert_eq!(draft.pricing().base, dec!(1600));
        assert_eq!(draft.pricing().total, dec!(1808));

        remove_line_item(&mut draft, &offering, 0).unwrap();
        assert_eq!(draft.line_items().len(), 1);
        assert_eq!(draft.pricing().base, dec!(800));
        assert_eq!(draft.pricing().taxes[0].amount, dec!(104));
        assert_eq!(draft.pricing().total, dec!(904));
    }

    #[test]
    fn cannot_remove_last_line_item() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        let before = draft.clone();

        let result = remove_line_item(&mut draft, &offering, 0);

        assert!(matches!(result, Err(BookingError::CapacityExceeded { .. })));
        assert_eq!(draft, before);
    }

    #[test]
    fn cannot_exceed_max_roster_size() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        for _ in 1..offering.max_roster_size() {
            add_line_item(&mut draft, &offering).unwrap();
        }
        let before = draft.clone();

        let result = add_line_item(&mut draft, &offering);

        assert_eq!(
            result,
            Err(BookingError::CapacityExceeded {
                requested: 7,
                min: 1,
                max: 6
            })
        );
        assert_eq!(draft, before);
    }

    #[test]
    fn slots_are_unique() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        add_line_item(&mut draft, &offering).unwrap();
        assign_slot(&mut draft, &offering, 0, "A1".into()).unwrap();
        let before = draft.clone();

        let result = assign_slot(&mut draft, &offering, 1, "A1".into());

        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
        assert_eq!(draft, before);
    }

    #[test]
    fn reassigning_own_slot_and_clearing() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        assign_slot(&mut draft, &offering, 0, "A2".into()).unwrap();
        assign_slot(&mut draft, &offering, 0, "A2".into()).unwrap();
        let pricing = draft.pricing().clone();

        clear_slot(&mut draft, 0).unwrap();

        assert_eq!(draft.line_items()[0].slot, None);
        assert_eq!(draft.pricing(), &pricing);
    }

    #[test]
    fn unpublished_slot_is_rejected() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);

        let result = assign_slot(&mut draft, &offering, 0, "Z9".into());

        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
    }

    #[test]
    fn cargo_has_no_roster() {
        let offering =
            ServiceOffering::try_from(OfferingDto::new("truck", ServiceKind::Cargo, dec!(10000), "NPR")).unwrap();
        let mut draft = BookingDraft::seed(&offering);

        let result = add_line_item(&mut draft, &offering);

        assert!(matches!(result, Err(BookingError::NotApplicable { .. })));
    }

    #[test]
    fn update_out_of_range_is_a_field_error() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);

        let result = update_line_item(&mut draft, 3, "Asha".into(), Some(30), PassengerCategory::Adult);

        assert_eq!(result, Err(BookingError::field("roster[3]", "no such line item")));
    }
}
