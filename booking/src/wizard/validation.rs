//! Step validation. Each check returns every offending field, not just the first.

use crate::error::FieldError;
use crate::types::{BookingDraft, Contact, Load, ServiceOffering};
use rust_decimal::Decimal;

/// Fields required before leaving `CollectingDetails`
#[must_use]
pub fn validate_details(draft: &BookingDraft, offering: &ServiceOffering) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let schedule = draft.schedule();
    let published = offering.schedule();

    if schedule.date.is_none() {
        errors.push(FieldError::new("schedule.date", "select a date"));
    }
    check_choice(
        &mut errors,
        "schedule.time_slot",
        schedule.time_slot.as_deref(),
        &published.time_slots,
        "time slot",
    );
    check_choice(
        &mut errors,
        "schedule.boarding_point",
        schedule.boarding_point.as_deref(),
        &published.boarding_points,
        "boarding point",
    );
    check_choice(
        &mut errors,
        "schedule.dropping_point",
        schedule.dropping_point.as_deref(),
        &published.dropping_points,
        "dropping point",
    );

    match draft.load() {
        Load::Roster(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.name.trim().is_empty() {
                    errors.push(FieldError::new(format!("roster[{index}].name"), "name is required"));
                }
            }
        },
        Load::Quantity(quantity) => {
            if *quantity <= Decimal::ZERO {
                errors.push(FieldError::new("quantity", "must be greater than zero"));
            }
        },
    }

    errors
}

/// A choice is required when the offering publishes options, and must be one of them
fn check_choice(errors: &mut Vec<FieldError>, field: &str, chosen: Option<&str>, published: &[String], label: &str) {
    if published.is_empty() {
        return;
    }
    match chosen {
        None => errors.push(FieldError::new(field, format!("select a {label}"))),
        Some(value) if !published.iter().any(|option| option == value) => {
            errors.push(FieldError::new(field, format!("{value} is not an available {label}")));
        },
        Some(_) => {},
    }
}

/// Fields required before leaving `CollectingContact`
#[must_use]
pub fn validate_contact(contact: &Contact) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if contact.name.trim().is_empty() {
        errors.push(FieldError::new("contact.name", "name is required"));
    }
    if contact.phone.trim().is_empty() {
        errors.push(FieldError::new("contact.phone", "phone is required"));
    } else if !is_plausible_phone(&contact.phone) {
        errors.push(FieldError::new("contact.phone", "not a valid phone number"));
    }
    if contact.email.trim().is_empty() {
        errors.push(FieldError::new("contact.email", "email is required"));
    } else if !is_valid_email(contact.email.trim()) {
        errors.push(FieldError::new("contact.email", "not a valid email address"));
    }
    let alt_phone = contact.alt_phone.as_deref().filter(|alt| !alt.trim().is_empty());
    if alt_phone.is_some_and(|alt| !is_plausible_phone(alt)) {
        errors.push(FieldError::new("contact.alt_phone", "not a valid phone number"));
    }

    errors
}

/// Validate email format (basic check)
///
/// # Examples
///
/// ```
/// use waypoint_booking::wizard::validation::is_valid_email;
///
/// assert!(is_valid_email("asha@example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("asha@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    // Must contain exactly one @
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') || local.is_empty() || domain.is_empty() {
        return false;
    }

    // Domain must contain at least one dot
    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local_chars)
        && domain.chars().all(valid_domain_chars)
        && domain.split('.').all(|part| !part.is_empty())
}

/// Digits with optional `+`, spaces, dashes and parentheses; 7 to 15 digits
fn is_plausible_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (c == '+' && i == 0));
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    allowed && (7..=15).contains(&digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{OfferingDto, ScheduleOptionsDto};
    use crate::types::{LineItem, ServiceKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn bus() -> ServiceOffering {
        ServiceOffering::try_from(
            OfferingDto::new("ktm-pkr", ServiceKind::SeatTransport, dec!(800), "NPR").with_schedule(
                ScheduleOptionsDto {
                    time_slots: vec!["07:00".into(), "13:00".into()],
                    boarding_points: vec!["Kalanki".into()],
                    ..ScheduleOptionsDto::default()
                },
            ),
        )
        .unwrap()
    }

    #[test]
    fn reports_every_missing_detail() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        draft.load = Load::Roster(vec![LineItem::default(), LineItem::default()]);
        draft.reprice(&offering);

        let errors = validate_details(&draft, &offering);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(
            fields,
            vec![
                "schedule.date",
                "schedule.time_slot",
                "schedule.boarding_point",
                "roster[0].name",
                "roster[1].name"
            ]
        );
    }

    #[test]
    fn complete_details_pass() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        draft.schedule.date = NaiveDate::from_ymd_opt(2025, 3, 1);
        draft.schedule.time_slot = Some("07:00".into());
        draft.schedule.boarding_point = Some("Kalanki".into());
        draft.load = Load::Roster(vec![LineItem {
            name: "Asha Gurung".into(),
            ..LineItem::default()
        }]);

        assert!(validate_details(&draft, &offering).is_empty());
    }

    #[test]
    fn unpublished_time_slot_is_rejected() {
        let offering = bus();
        let mut draft = BookingDraft::seed(&offering);
        draft.schedule.time_slot = Some("23:00".into());

        let errors = validate_details(&draft, &offering);

        assert!(errors
            .iter()
            .any(|e| e.field == "schedule.time_slot" && e.reason.contains("not an available")));
    }

    #[test]
    fn contact_requires_name_phone_and_valid_email() {
        let errors = validate_contact(&Contact {
            name: String::new(),
            phone: "98-4100-0000".into(),
            email: "not-an-email".into(),
            alt_phone: Some("12".into()),
        });
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(fields, vec!["contact.name", "contact.email", "contact.alt_phone"]);
    }

    #[test]
    fn phone_shapes() {
        assert!(is_plausible_phone("+977 9841000000"));
        assert!(is_plausible_phone("(01) 442-1234"));
        assert!(!is_plausible_phone("call me"));
        assert!(!is_plausible_phone("12+345678"));
    }
}
