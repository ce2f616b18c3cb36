use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::audit::{AuditError, AuditLog};
use super::domain::{AuditRecord, ListingId, ReservationRequest, ValidatedReservation};
use super::horizon::Horizon;
use super::ledger::{AvailabilityLedger, Cell, LedgerError};
use super::store::{LedgerStore, StorageError};
use super::validate::{validate, RejectReason};

/// Outcome of a single reservation attempt.
///
/// Rejections and unavailability are ordinary outcomes the guest can retry
/// past; only storage and internal ledger faults surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    Confirmed(AuditRecord),
    Rejected(RejectReason),
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// One listing-day of the availability view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: bool,
}

/// Facade over the validator, the conflict check, and the commit pipeline.
///
/// Owns the in-memory ledger and its durable store. Designed as a single
/// logical actor: there is no internal locking, so concurrent callers must
/// serialize access around the whole attempt (the HTTP layer holds a mutex).
pub struct BookingEngine {
    ledger: AvailabilityLedger,
    known_listings: BTreeSet<ListingId>,
    store: LedgerStore,
    audit: AuditLog,
}

impl BookingEngine {
    /// Load the persisted ledger (or seed it from the catalog ids) and
    /// assemble the engine around it.
    pub fn open(
        horizon: Horizon,
        catalog_ids: BTreeSet<ListingId>,
        store: LedgerStore,
        audit: AuditLog,
    ) -> Result<Self, EngineError> {
        let ledger = store.load_or_initialize(horizon, &catalog_ids)?;
        let known_listings = ledger.listing_ids().collect();

        Ok(Self {
            ledger,
            known_listings,
            store,
            audit,
        })
    }

    pub fn horizon(&self) -> &Horizon {
        self.ledger.horizon()
    }

    /// Run one reservation attempt through validate, availability check, and
    /// commit. `today` anchors the no-past-dates rule; callers pass the
    /// current date at the boundary so the engine stays clock-free.
    pub fn attempt_reservation(
        &mut self,
        request: &ReservationRequest,
        today: NaiveDate,
    ) -> Result<ReservationOutcome, EngineError> {
        let stay = match validate(request, self.ledger.horizon(), &self.known_listings, today) {
            Ok(stay) => stay,
            Err(reason) => {
                debug!(%reason, "reservation request rejected");
                return Ok(ReservationOutcome::Rejected(reason));
            }
        };

        if !self
            .ledger
            .range_is_free(stay.listing_id, stay.start_index, stay.end_index)?
        {
            warn!(
                listing = %stay.listing_id,
                start = %stay.start_date,
                end = %stay.end_date,
                "requested stay overlaps an existing booking"
            );
            return Ok(ReservationOutcome::Unavailable);
        }

        let record = self.commit(&stay)?;
        Ok(ReservationOutcome::Confirmed(record))
    }

    /// Commit pipeline: audit line first, then mark the exact stay and
    /// rewrite the ledger. Availability was confirmed by the caller path;
    /// this does not re-check.
    fn commit(&mut self, stay: &ValidatedReservation) -> Result<AuditRecord, EngineError> {
        let record = AuditRecord::for_stay(stay);
        self.audit.append(&record)?;
        self.ledger
            .mark_booked(stay.listing_id, stay.start_index, stay.end_index)?;
        self.store.persist(&self.ledger)?;

        info!(
            listing = %record.listing_id,
            start = %record.start_date,
            end = %record.end_date,
            "reservation committed"
        );
        Ok(record)
    }

    /// Read-only per-day availability for one listing across the window.
    pub fn availability(&self, listing_id: ListingId) -> Result<Vec<DayAvailability>, LedgerError> {
        let horizon = *self.ledger.horizon();
        let row = self.ledger.row(listing_id)?;

        Ok(row
            .iter()
            .enumerate()
            .map(|(offset, cell)| DayAvailability {
                date: horizon.date_for_index(offset as i64 + 1),
                available: *cell == Cell::Free,
            })
            .collect())
    }
}
