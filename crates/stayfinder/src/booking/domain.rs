use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Numeric listing identifier shared by the catalog and the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ListingId(pub u32);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListingId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<u32>().map(Self)
    }
}

/// Raw, unvalidated reservation input exactly as the booking form submits it.
///
/// Ephemeral: constructed per attempt and discarded after processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub listing_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// A reservation request that passed every validation rule.
///
/// Indices are day offsets relative to the engine's horizon, ready for the
/// availability check and the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReservation {
    pub listing_id: ListingId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_index: i64,
    pub end_index: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Immutable record of one committed booking, appended to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub listing_id: ListingId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AuditRecord {
    pub fn for_stay(stay: &ValidatedReservation) -> Self {
        Self {
            first_name: stay.first_name.clone(),
            last_name: stay.last_name.clone(),
            email: stay.email.clone(),
            phone: stay.phone.clone(),
            listing_id: stay.listing_id,
            start_date: stay.start_date,
            end_date: stay.end_date,
        }
    }
}
