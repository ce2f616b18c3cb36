use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::domain::{ListingId, ReservationRequest, ValidatedReservation};
use super::horizon::Horizon;

/// Why a reservation request was turned away before touching the ledger.
///
/// Each variant carries the message shown to the guest; no state is mutated
/// on any of these paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("end date can't be before start date")]
    EndBeforeStart,
    #[error("can't reserve a stay in the past")]
    StartInPast,
    #[error("the booking window opens on {opens}")]
    BeforeBookingWindow { opens: NaiveDate },
    #[error("the requested dates fall beyond the booking window")]
    BeyondBookingWindow,
    #[error("no listing matches the requested id")]
    UnknownListing,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
}

/// Check a raw request against the booking rules.
///
/// Pure: no side effects, deterministic for a given `today`. Checks run in a
/// fixed order and the first failure wins, so the guest always sees the same
/// message for the same input.
pub fn validate(
    request: &ReservationRequest,
    horizon: &Horizon,
    known_listings: &BTreeSet<ListingId>,
    today: NaiveDate,
) -> Result<ValidatedReservation, RejectReason> {
    if request.end_date < request.start_date {
        return Err(RejectReason::EndBeforeStart);
    }

    if request.start_date < today {
        return Err(RejectReason::StartInPast);
    }

    let opens = horizon.reference_date();
    if request.start_date < opens || request.end_date < opens {
        return Err(RejectReason::BeforeBookingWindow { opens });
    }

    if horizon.day_index(request.end_date) > i64::from(horizon.length_days()) {
        return Err(RejectReason::BeyondBookingWindow);
    }

    let listing_id = request
        .listing_id
        .parse::<ListingId>()
        .ok()
        .filter(|id| known_listings.contains(id))
        .ok_or(RejectReason::UnknownListing)?;

    if !email_shape_is_plausible(&request.email) {
        return Err(RejectReason::InvalidEmail);
    }

    if !phone_is_ten_digits(&request.phone) {
        return Err(RejectReason::InvalidPhone);
    }

    Ok(ValidatedReservation {
        listing_id,
        start_date: request.start_date,
        end_date: request.end_date,
        start_index: horizon.day_index(request.start_date),
        end_index: horizon.day_index(request.end_date),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        email: request.email.clone(),
        phone: request.phone.clone(),
    })
}

/// At least one `@` and one `.`, with the last `@` before the last `.`.
fn email_shape_is_plausible(email: &str) -> bool {
    match (email.rfind('@'), email.rfind('.')) {
        (Some(at), Some(dot)) => at < dot,
        _ => false,
    }
}

fn phone_is_ten_digits(phone: &str) -> bool {
    phone.chars().count() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}
