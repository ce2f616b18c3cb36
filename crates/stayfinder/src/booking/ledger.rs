use std::collections::BTreeMap;

use super::domain::ListingId;
use super::horizon::Horizon;

/// Occupancy marker for one tracked day of one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Booked,
}

/// Internal consistency fault: a row was requested for an id the ledger does
/// not track. Indicates the catalog and the ledger have drifted apart; never
/// a user-facing validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("listing {0} has no availability row")]
    UnknownListing(ListingId),
}

/// Per-listing, per-day occupancy table; the engine's source of truth.
///
/// Every row holds exactly `length_days` cells, the cell for day index `d`
/// at position `d - 1`. Cells only ever transition `Free` to `Booked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityLedger {
    horizon: Horizon,
    rows: BTreeMap<ListingId, Vec<Cell>>,
}

impl AvailabilityLedger {
    /// Fresh ledger with every tracked day free for every listing.
    pub fn seeded<I>(horizon: Horizon, listing_ids: I) -> Self
    where
        I: IntoIterator<Item = ListingId>,
    {
        let length = horizon.length_days() as usize;
        let rows = listing_ids
            .into_iter()
            .map(|id| (id, vec![Cell::Free; length]))
            .collect();

        Self { horizon, rows }
    }

    /// Assemble from already-validated rows; the store checks row lengths
    /// before calling this.
    pub(crate) fn from_rows(horizon: Horizon, rows: BTreeMap<ListingId, Vec<Cell>>) -> Self {
        Self { horizon, rows }
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn listing_ids(&self) -> impl Iterator<Item = ListingId> + '_ {
        self.rows.keys().copied()
    }

    pub fn contains(&self, listing_id: ListingId) -> bool {
        self.rows.contains_key(&listing_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = (ListingId, &[Cell])> {
        self.rows.iter().map(|(id, cells)| (*id, cells.as_slice()))
    }

    pub(crate) fn add_free_rows<I>(&mut self, listing_ids: I)
    where
        I: IntoIterator<Item = ListingId>,
    {
        let length = self.horizon.length_days() as usize;
        for id in listing_ids {
            self.rows.entry(id).or_insert_with(|| vec![Cell::Free; length]);
        }
    }

    pub fn row(&self, listing_id: ListingId) -> Result<&[Cell], LedgerError> {
        self.rows
            .get(&listing_id)
            .map(Vec::as_slice)
            .ok_or(LedgerError::UnknownListing(listing_id))
    }

    /// Whether every cell in the buffered window around the stay is free.
    ///
    /// The requested `[start_index, end_index]` is widened by one day on each
    /// side before reading, clamped to the tracked window. The widened read
    /// is deliberately broader than the range `mark_booked` later writes.
    pub fn range_is_free(
        &self,
        listing_id: ListingId,
        start_index: i64,
        end_index: i64,
    ) -> Result<bool, LedgerError> {
        let row = self.row(listing_id)?;
        let lo = (start_index - 1).max(1);
        let hi = (end_index + 1).min(i64::from(self.horizon.length_days()));

        for day in lo..=hi {
            if row[(day - 1) as usize] == Cell::Booked {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Mark the exact stay as booked, clamped to the tracked window.
    ///
    /// Precondition: the caller confirmed availability with `range_is_free`;
    /// this write does not re-check.
    pub fn mark_booked(
        &mut self,
        listing_id: ListingId,
        start_index: i64,
        end_index: i64,
    ) -> Result<(), LedgerError> {
        let length = i64::from(self.horizon.length_days());
        let row = self
            .rows
            .get_mut(&listing_id)
            .ok_or(LedgerError::UnknownListing(listing_id))?;

        for day in start_index.max(1)..=end_index.min(length) {
            row[(day - 1) as usize] = Cell::Booked;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ledger() -> AvailabilityLedger {
        let reference = NaiveDate::from_ymd_opt(2020, 12, 17).expect("valid date");
        let horizon = Horizon::new(reference, 90).expect("valid horizon");
        AvailabilityLedger::seeded(horizon, [ListingId(100), ListingId(205)])
    }

    #[test]
    fn seeded_rows_are_all_free() {
        let ledger = ledger();
        let row = ledger.row(ListingId(100)).expect("row present");
        assert_eq!(row.len(), 90);
        assert!(row.iter().all(|cell| *cell == Cell::Free));
    }

    #[test]
    fn unknown_listing_row_is_an_error() {
        let ledger = ledger();
        assert_eq!(
            ledger.row(ListingId(9999)),
            Err(LedgerError::UnknownListing(ListingId(9999)))
        );
    }

    #[test]
    fn marked_range_blocks_the_buffered_window() {
        let mut ledger = ledger();
        ledger
            .mark_booked(ListingId(100), 15, 17)
            .expect("mark succeeds");

        // The exact range and one day either side read as occupied.
        assert!(!ledger.range_is_free(ListingId(100), 15, 17).expect("row"));
        assert!(!ledger.range_is_free(ListingId(100), 18, 20).expect("row"));
        assert!(!ledger.range_is_free(ListingId(100), 12, 14).expect("row"));
        // Two days clear of the booking is outside the buffer.
        assert!(ledger.range_is_free(ListingId(100), 19, 21).expect("row"));
        assert!(ledger.range_is_free(ListingId(100), 10, 13).expect("row"));
    }

    #[test]
    fn mark_booked_leaves_neighbor_days_free() {
        let mut ledger = ledger();
        ledger
            .mark_booked(ListingId(100), 15, 17)
            .expect("mark succeeds");

        let row = ledger.row(ListingId(100)).expect("row present");
        assert_eq!(row[13], Cell::Free);
        assert_eq!(row[14], Cell::Booked);
        assert_eq!(row[16], Cell::Booked);
        assert_eq!(row[17], Cell::Free);
    }

    #[test]
    fn other_listings_are_unaffected() {
        let mut ledger = ledger();
        ledger
            .mark_booked(ListingId(100), 1, 90)
            .expect("mark succeeds");
        assert!(ledger.range_is_free(ListingId(205), 1, 90).expect("row"));
    }

    #[test]
    fn ranges_clamp_to_the_tracked_window() {
        let mut ledger = ledger();
        ledger
            .mark_booked(ListingId(100), 89, 92)
            .expect("mark clamps");
        let row = ledger.row(ListingId(100)).expect("row present");
        assert_eq!(row[88], Cell::Booked);
        assert_eq!(row[89], Cell::Booked);
        // Buffered read off the front edge never indexes day zero.
        assert!(ledger.range_is_free(ListingId(205), 1, 3).expect("row"));
    }
}
