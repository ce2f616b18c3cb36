use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::domain::AuditRecord;

const DATE_FORMAT: &str = "%d-%b-%Y";

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to append to the reservation log: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only log of committed reservations.
///
/// One tab-separated line per booking, each field padded or truncated to a
/// fixed column width so the log lines up when read in a terminal. Written
/// by the commit pipeline only; never read back by the engine.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the log file on first use.
    pub fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_line(record).as_bytes())?;
        Ok(())
    }
}

fn format_line(record: &AuditRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
        column(&record.first_name, 15),
        column(&record.last_name, 20),
        column(&record.email, 25),
        column(&record.phone, 12),
        column(&record.listing_id.to_string(), 8),
        column(&record.start_date.format(DATE_FORMAT).to_string(), 20),
        column(&record.end_date.format(DATE_FORMAT).to_string(), 20),
    )
}

fn column(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{truncated:<width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::domain::ListingId;
    use chrono::NaiveDate;

    fn record() -> AuditRecord {
        AuditRecord {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "6175551234".to_string(),
            listing_id: ListingId(100),
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2021, 1, 3).expect("valid date"),
        }
    }

    #[test]
    fn line_uses_fixed_width_tab_separated_columns() {
        let line = format_line(&record());
        let fields: Vec<&str> = line.trim_end_matches('\n').split('\t').collect();

        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "Ada            ");
        assert_eq!(fields[0].len(), 15);
        assert_eq!(fields[1].len(), 20);
        assert_eq!(fields[2].len(), 25);
        assert_eq!(fields[3].len(), 12);
        assert_eq!(fields[4], "100     ");
        assert_eq!(fields[5].trim_end(), "01-Jan-2021");
        assert_eq!(fields[6].trim_end(), "03-Jan-2021");
    }

    #[test]
    fn over_width_fields_are_truncated() {
        let mut long = record();
        long.first_name = "a".repeat(40);
        let line = format_line(&long);
        let first = line.split('\t').next().expect("first column");
        assert_eq!(first.len(), 15);
    }

    #[test]
    fn append_creates_the_log_and_accumulates_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AuditLog::new(dir.path().join("log.txt"));

        log.append(&record()).expect("first append");
        log.append(&record()).expect("second append");

        let contents = std::fs::read_to_string(log.path()).expect("log readable");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("Ada"));
    }
}
