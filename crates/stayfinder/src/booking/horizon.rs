use chrono::{Duration, NaiveDate};

/// Fixed calendar window the availability ledger tracks.
///
/// Day index `d` names the calendar date `reference_date + d` days. Tracked
/// indices run `1..=length_days`; the reference date itself sits at index 0,
/// one day before the first bookable night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    reference_date: NaiveDate,
    length_days: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum HorizonError {
    #[error("booking horizon must cover at least one day")]
    EmptyWindow,
}

impl Horizon {
    pub fn new(reference_date: NaiveDate, length_days: u32) -> Result<Self, HorizonError> {
        if length_days == 0 {
            return Err(HorizonError::EmptyWindow);
        }

        Ok(Self {
            reference_date,
            length_days,
        })
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn length_days(&self) -> u32 {
        self.length_days
    }

    /// Signed day offset of `date` from the reference date.
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        (date - self.reference_date).num_days()
    }

    /// Whether `date` lands on a tracked day index.
    pub fn is_within(&self, date: NaiveDate) -> bool {
        let index = self.day_index(date);
        index >= 1 && index <= i64::from(self.length_days)
    }

    /// Calendar date for a day index; inverse of `day_index`.
    pub fn date_for_index(&self, index: i64) -> NaiveDate {
        self.reference_date + Duration::days(index)
    }
}
