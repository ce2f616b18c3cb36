use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::domain::ListingId;
use super::horizon::Horizon;
use super::ledger::{AvailabilityLedger, Cell};

/// Sentinel written for an occupied cell. Any non-empty value counts as
/// booked on load; only emptiness is significant.
const BOOKED_MARKER: &str = "x";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access ledger storage: {0}")]
    Io(#[from] io::Error),
    #[error("persisted ledger is not a valid table: {0}")]
    Csv(#[from] csv::Error),
    #[error("persisted ledger row has non-numeric listing id '{raw}'")]
    MalformedListingId { raw: String },
    #[error("persisted row for listing {listing} has {found} day cells, expected {expected}")]
    MalformedRow {
        listing: ListingId,
        expected: usize,
        found: usize,
    },
}

/// Durable home of the availability ledger: one CSV table keyed by listing
/// id with a column per tracked day, rewritten whole on every commit.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted table, or seed a fresh all-free ledger from the
    /// catalog ids when no file exists yet. Seeding persists immediately so
    /// the table is durable from the first run onward.
    ///
    /// Catalog ids absent from a loaded table get fresh free rows, keeping
    /// the every-listing-has-a-row invariant when the catalog grows.
    pub fn load_or_initialize(
        &self,
        horizon: Horizon,
        catalog_ids: &BTreeSet<ListingId>,
    ) -> Result<AvailabilityLedger, StorageError> {
        if !self.path.exists() {
            info!(
                path = %self.path.display(),
                listings = catalog_ids.len(),
                "no persisted ledger found, seeding a fresh availability table"
            );
            let ledger = AvailabilityLedger::seeded(horizon, catalog_ids.iter().copied());
            self.persist(&ledger)?;
            return Ok(ledger);
        }

        let mut ledger = self.read(horizon)?;

        let missing: Vec<ListingId> = catalog_ids
            .iter()
            .copied()
            .filter(|id| !ledger.contains(*id))
            .collect();
        if !missing.is_empty() {
            warn!(
                count = missing.len(),
                "catalog listings missing from the persisted ledger, adding free rows"
            );
            ledger.add_free_rows(missing);
            self.persist(&ledger)?;
        }

        Ok(ledger)
    }

    fn read(&self, horizon: Horizon) -> Result<AvailabilityLedger, StorageError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let expected = horizon.length_days() as usize;
        let mut rows = BTreeMap::new();

        for record in reader.records() {
            let record = record?;
            let raw_id = record.get(0).unwrap_or_default();
            let listing = raw_id
                .parse::<ListingId>()
                .map_err(|_| StorageError::MalformedListingId {
                    raw: raw_id.to_string(),
                })?;

            let cells: Vec<Cell> = record
                .iter()
                .skip(1)
                .map(|value| {
                    if value.is_empty() {
                        Cell::Free
                    } else {
                        Cell::Booked
                    }
                })
                .collect();
            if cells.len() != expected {
                return Err(StorageError::MalformedRow {
                    listing,
                    expected,
                    found: cells.len(),
                });
            }

            rows.insert(listing, cells);
        }

        Ok(AvailabilityLedger::from_rows(horizon, rows))
    }

    /// Rewrite the whole table. The new content lands in a sibling staging
    /// file and replaces the old one via rename, so a crash leaves either the
    /// previous or the new complete table, never a partial write.
    pub fn persist(&self, ledger: &AvailabilityLedger) -> Result<(), StorageError> {
        let staging = self.staging_path();
        let mut writer = csv::Writer::from_path(&staging)?;

        let length = ledger.horizon().length_days();
        let mut header = Vec::with_capacity(length as usize + 1);
        header.push("id".to_string());
        for day in 1..=length {
            header.push(day.to_string());
        }
        writer.write_record(&header)?;

        for (listing, cells) in ledger.rows() {
            let mut record = Vec::with_capacity(cells.len() + 1);
            record.push(listing.to_string());
            for cell in cells {
                record.push(match cell {
                    Cell::Free => String::new(),
                    Cell::Booked => BOOKED_MARKER.to_string(),
                });
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        drop(writer);
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn horizon() -> Horizon {
        let reference = NaiveDate::from_ymd_opt(2020, 12, 17).expect("valid date");
        Horizon::new(reference, 90).expect("valid horizon")
    }

    fn catalog_ids() -> BTreeSet<ListingId> {
        [ListingId(100), ListingId(205), ListingId(318)]
            .into_iter()
            .collect()
    }

    #[test]
    fn absent_file_seeds_and_persists_a_fresh_ledger() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LedgerStore::new(dir.path().join("booking.csv"));

        let ledger = store
            .load_or_initialize(horizon(), &catalog_ids())
            .expect("seeds");

        assert_eq!(ledger.len(), 3);
        assert!(store.path().exists());
        assert!(ledger.range_is_free(ListingId(100), 1, 90).expect("row"));
    }

    #[test]
    fn persisted_ledger_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LedgerStore::new(dir.path().join("booking.csv"));

        let mut ledger = store
            .load_or_initialize(horizon(), &catalog_ids())
            .expect("seeds");
        ledger
            .mark_booked(ListingId(205), 15, 17)
            .expect("mark succeeds");
        store.persist(&ledger).expect("persists");

        let reloaded = store
            .load_or_initialize(horizon(), &catalog_ids())
            .expect("loads");
        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn missing_catalog_ids_gain_free_rows_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LedgerStore::new(dir.path().join("booking.csv"));

        let seeded: BTreeSet<ListingId> = [ListingId(100)].into_iter().collect();
        store
            .load_or_initialize(horizon(), &seeded)
            .expect("seeds one row");

        let reloaded = store
            .load_or_initialize(horizon(), &catalog_ids())
            .expect("reconciles");
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains(ListingId(318)));
    }

    #[test]
    fn short_row_is_a_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("booking.csv");
        fs::write(&path, "id,1,2,3\n100,,x,\n").expect("write fixture");

        let store = LedgerStore::new(&path);
        match store.load_or_initialize(horizon(), &catalog_ids()) {
            Err(StorageError::MalformedRow {
                listing, expected, ..
            }) => {
                assert_eq!(listing, ListingId(100));
                assert_eq!(expected, 90);
            }
            other => panic!("expected malformed row error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_listing_id_is_a_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("booking.csv");
        let cells = ",".repeat(90);
        fs::write(&path, format!("id,{}\nnot-a-number{}\n", header_days(), cells))
            .expect("write fixture");

        let store = LedgerStore::new(&path);
        match store.load_or_initialize(horizon(), &catalog_ids()) {
            Err(StorageError::MalformedListingId { raw }) => {
                assert_eq!(raw, "not-a-number");
            }
            other => panic!("expected malformed id error, got {other:?}"),
        }
    }

    #[test]
    fn any_nonempty_cell_reads_as_booked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("booking.csv");
        // A table written by the previous generation of the tool used `0`
        // as its marker; the store accepts any sentinel.
        let mut row = String::from("100");
        for day in 1..=90 {
            row.push(',');
            if day == 15 {
                row.push('0');
            }
        }
        fs::write(&path, format!("id,{}\n{row}\n", header_days())).expect("write fixture");

        let store = LedgerStore::new(&path);
        let ledger = store
            .load_or_initialize(horizon(), &catalog_ids())
            .expect("loads");
        assert!(!ledger.range_is_free(ListingId(100), 15, 15).expect("row"));
    }

    fn header_days() -> String {
        (1..=90).map(|d| d.to_string()).collect::<Vec<_>>().join(",")
    }
}
