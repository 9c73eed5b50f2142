//! The year-month key used to bucket transactions by calendar month.

use std::fmt::Display;

use serde::{Serialize, Serializer};
use time::Date;

/// A calendar month, e.g. January 2024.
///
/// Ordering is chronological and matches the lexicographic order of the
/// `YYYY-MM` text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year, 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::MonthKey;

    #[test]
    fn formats_as_year_and_month() {
        let month = MonthKey::from_date(date!(2024 - 01 - 15));

        assert_eq!(month.to_string(), "2024-01");
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 1);
    }

    #[test]
    fn orders_chronologically() {
        let december = MonthKey::from_date(date!(2023 - 12 - 31));
        let january = MonthKey::from_date(date!(2024 - 01 - 01));
        let february = MonthKey::from_date(date!(2024 - 02 - 01));

        assert!(december < january);
        assert!(january < february);
        assert!(december.to_string() < january.to_string());
    }

    #[test]
    fn serializes_as_string() {
        let month = MonthKey::from_date(date!(2024 - 02 - 29));

        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2024-02\"");
    }
}
