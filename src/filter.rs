//! Category and date-range filters applied to the ledger before aggregation.
//!
//! Filters never modify their input, they return a new vector.

use std::collections::BTreeSet;

use time::Date;

use crate::transaction::Transaction;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range.
    pub end: Date,
}

impl DateRange {
    /// The number of days in the range, counting both ends.
    ///
    /// A range whose end is before its start has zero days.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).whole_days() + 1).max(0)
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keep the transactions whose category is in `categories`.
///
/// `None` or an empty set means "no filtering": every transaction is kept.
/// This mirrors a category picker where clearing the selection shows
/// everything.
pub fn filter_by_category(
    transactions: &[Transaction],
    categories: Option<&BTreeSet<String>>,
) -> Vec<Transaction> {
    match categories.filter(|categories| !categories.is_empty()) {
        Some(categories) => transactions
            .iter()
            .filter(|transaction| categories.contains(&transaction.category))
            .cloned()
            .collect(),
        None => transactions.to_vec(),
    }
}

/// Keep the transactions dated within `start..=end`.
///
/// If either bound is `None` no date filtering is applied.
pub fn filter_by_date_range(
    transactions: &[Transaction],
    start: Option<Date>,
    end: Option<Date>,
) -> Vec<Transaction> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let range = DateRange { start, end };
            transactions
                .iter()
                .filter(|transaction| range.contains(transaction.date))
                .cloned()
                .collect()
        }
        _ => transactions.to_vec(),
    }
}

/// The filters selected for one dashboard request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// The categories to keep, empty to keep all.
    pub categories: BTreeSet<String>,
    /// The first day to keep.
    pub start_date: Option<Date>,
    /// The last day to keep.
    pub end_date: Option<Date>,
}

impl TransactionFilter {
    /// The selected date range, if both ends are set.
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        }
    }

    /// Apply the date filter and then the category filter.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let in_range = filter_by_date_range(transactions, self.start_date, self.end_date);

        filter_by_category(&in_range, Some(&self.categories))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::transaction::Transaction;

    use super::{DateRange, TransactionFilter, filter_by_category, filter_by_date_range};

    fn create_test_transaction(category: &str, date: time::Date) -> Transaction {
        Transaction::new(date, category, Decimal::new(100, 0), None)
    }

    fn get_test_transactions() -> Vec<Transaction> {
        vec![
            create_test_transaction("Income", date!(2024 - 01 - 05)),
            create_test_transaction("Rent", date!(2024 - 01 - 10)),
            create_test_transaction("Groceries", date!(2024 - 01 - 20)),
            create_test_transaction("Rent", date!(2024 - 02 - 10)),
        ]
    }

    fn categories(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn category_filter_keeps_members() {
        let transactions = get_test_transactions();

        let result = filter_by_category(&transactions, Some(&categories(&["Rent"])));

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|t| t.category == "Rent"));
    }

    #[test]
    fn category_filter_with_all_categories_is_identity() {
        let transactions = get_test_transactions();
        let all = categories(&["Income", "Rent", "Groceries"]);

        assert_eq!(filter_by_category(&transactions, Some(&all)), transactions);
    }

    #[test]
    fn empty_or_absent_category_filter_is_identity() {
        let transactions = get_test_transactions();

        assert_eq!(
            filter_by_category(&transactions, Some(&BTreeSet::new())),
            transactions
        );
        assert_eq!(filter_by_category(&transactions, None), transactions);
    }

    #[test]
    fn date_filter_is_inclusive() {
        let transactions = get_test_transactions();

        let result = filter_by_date_range(
            &transactions,
            Some(date!(2024 - 01 - 10)),
            Some(date!(2024 - 02 - 10)),
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].date, date!(2024 - 01 - 10));
        assert_eq!(result[2].date, date!(2024 - 02 - 10));
    }

    #[test]
    fn date_filter_with_missing_bound_is_identity() {
        let transactions = get_test_transactions();

        assert_eq!(
            filter_by_date_range(&transactions, Some(date!(2024 - 01 - 10)), None),
            transactions
        );
        assert_eq!(
            filter_by_date_range(&transactions, None, Some(date!(2024 - 01 - 10))),
            transactions
        );
    }

    #[test]
    fn date_filter_with_reversed_bounds_is_empty() {
        let transactions = get_test_transactions();

        let result = filter_by_date_range(
            &transactions,
            Some(date!(2024 - 02 - 01)),
            Some(date!(2024 - 01 - 01)),
        );

        assert!(result.is_empty());
    }

    #[test]
    fn filter_applies_dates_then_categories() {
        let transactions = get_test_transactions();
        let filter = TransactionFilter {
            categories: categories(&["Rent"]),
            start_date: Some(date!(2024 - 01 - 01)),
            end_date: Some(date!(2024 - 01 - 31)),
        };

        let result = filter.apply(&transactions);

        assert_eq!(result, vec![transactions[1].clone()]);
        // The source is left untouched.
        assert_eq!(transactions.len(), 4);
    }

    #[test]
    fn date_range_counts_both_ends() {
        let range = DateRange {
            start: date!(2024 - 01 - 01),
            end: date!(2024 - 01 - 10),
        };

        assert_eq!(range.days(), 10);
        assert!(range.contains(date!(2024 - 01 - 10)));
        assert!(!range.contains(date!(2024 - 01 - 11)));
    }
}
