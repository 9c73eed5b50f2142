//! Transaction data aggregation and transformation for the dashboard.
//!
//! Provides pure functions that turn an already-filtered set of transactions
//! into monthly summaries, daily averages, month-over-month changes, trend
//! directions and the series behind the dashboard charts.
//!
//! Amounts are accumulated as [Decimal] so that sums of cents stay exact.
//! Percentages are reported as `f64`.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use time::Date;

use crate::{dashboard::month::MonthKey, filter::DateRange, transaction::Transaction};

const MINIMUM_MONTHS_FOR_CHANGE: usize = 2;
const MINIMUM_MONTHS_FOR_TREND: usize = 3;
/// Relative change, in percent, beyond which a trend is no longer "stable".
const TREND_THRESHOLD_PERCENT: f64 = 5.0;
/// The number of daily observations averaged for the trend chart.
const MOVING_AVERAGE_WINDOW: usize = 7;

// ============================================================================
// MODELS
// ============================================================================

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    /// The month the totals cover.
    pub month: MonthKey,
    /// The sum of "Income" transactions.
    pub income: Decimal,
    /// The sum of all other transactions.
    pub expenses: Decimal,
    /// `income - expenses`.
    pub net: Decimal,
}

/// Whether a category's monthly totals are going up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// The recent average is more than 5% above the older average.
    Increasing,
    /// The recent average is more than 5% below the older average.
    Decreasing,
    /// The averages are within 5% of each other.
    Stable,
    /// Fewer than three months of data.
    InsufficientData,
}

/// The trend of one category's monthly totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTrend {
    /// The direction of the trend.
    pub direction: TrendDirection,
    /// The relative change of the recent average over the older average.
    pub percentage: f64,
}

/// The headline numbers shown above the charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The sum of "Income" transactions.
    pub total_income: Decimal,
    /// The sum of all other transactions.
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`.
    pub net_balance: Decimal,
    /// Expenses spread over the days of the selected date range, zero when no
    /// complete range is selected.
    pub daily_average: Decimal,
}

/// The total amount of one category, used for distribution charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The sum of the category's amounts.
    pub total: Decimal,
}

/// One category's totals, aligned with [MonthlyCategoryTable::months].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    /// The category name.
    pub category: String,
    /// One total per month, zero for months without data.
    pub values: Vec<Decimal>,
}

/// Month-by-category totals for the month-over-month comparison chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyCategoryTable {
    /// Every month with data, in chronological order.
    pub months: Vec<MonthKey>,
    /// One series per category, ordered by category name.
    pub series: Vec<CategorySeries>,
}

/// A daily total and its moving average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// The day the total covers.
    pub date: Date,
    /// The sum of the category's amounts on `date`.
    pub amount: Decimal,
    /// The mean of this and up to six preceding daily totals.
    pub moving_average: Decimal,
}

/// The daily totals of one category for the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrendSeries {
    /// The category name.
    pub category: String,
    /// The daily points in chronological order.
    pub points: Vec<TrendPoint>,
}

// ============================================================================
// CORE AGGREGATIONS
// ============================================================================

/// Sums income and expenses by calendar month.
///
/// # Returns
/// One entry per month with data, in chronological order. Empty input gives
/// an empty vector.
pub fn monthly_stats(transactions: &[Transaction]) -> Vec<MonthlyStats> {
    let mut totals: BTreeMap<MonthKey, (Decimal, Decimal)> = BTreeMap::new();

    for transaction in transactions {
        let (income, expenses) = totals
            .entry(MonthKey::from_date(transaction.date))
            .or_default();

        if transaction.is_income() {
            *income = income.saturating_add(transaction.amount);
        } else {
            *expenses = expenses.saturating_add(transaction.amount);
        }
    }

    totals
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyStats {
            month,
            income,
            expenses,
            net: income.saturating_sub(expenses),
        })
        .collect()
}

/// Calculates the average amount per day for each category.
///
/// The number of days is the inclusive span between the earliest and latest
/// transaction of the whole set, not of each category.
///
/// # Returns
/// A mapping from category to its daily average. Empty input gives an empty
/// mapping.
pub fn daily_averages(transactions: &[Transaction]) -> BTreeMap<String, Decimal> {
    let Some(span) = date_span(transactions) else {
        return BTreeMap::new();
    };

    let days = span.days();
    if days == 0 {
        return BTreeMap::new();
    }
    let days = Decimal::from(days);

    totals_by_category(transactions)
        .into_iter()
        .map(|(category, total)| (category, total / days))
        .collect()
}

/// Calculates the month-over-month percentage change for each category.
///
/// Each category compares its two most recent months with data. A month the
/// category is absent from is skipped, so "previous" is the category's last
/// appearance before its most recent month rather than the calendar month
/// before it.
///
/// When the previous total is zero, the change is clamped to `0` if the
/// current total is also zero and `100` otherwise, instead of infinity.
///
/// # Returns
/// A mapping from category to percent change. Categories with fewer than two
/// months of data are left out. If the whole set spans fewer than two months
/// the mapping is empty.
pub fn percentage_changes(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    if distinct_months(transactions).len() < MINIMUM_MONTHS_FOR_CHANGE {
        return BTreeMap::new();
    }

    monthly_totals_by_category(transactions)
        .into_iter()
        .filter_map(|(category, monthly_totals)| {
            let mut recent_first = monthly_totals.values().rev();
            let current = *recent_first.next()?;
            let previous = *recent_first.next()?;

            Some((category, percent_change_from(previous, current)))
        })
        .collect()
}

/// Classifies the direction of each category's monthly totals.
///
/// The mean of the category's last two monthly totals is compared with the
/// mean of its first two. With exactly three months the two windows share the
/// middle month.
///
/// # Returns
/// A mapping from category to its trend. Categories with fewer than three
/// months of data are marked [TrendDirection::InsufficientData].
pub fn trend_directions(transactions: &[Transaction]) -> BTreeMap<String, CategoryTrend> {
    monthly_totals_by_category(transactions)
        .into_iter()
        .map(|(category, monthly_totals)| {
            let totals: Vec<Decimal> = monthly_totals.into_values().collect();
            (category, classify_trend(&totals))
        })
        .collect()
}

fn classify_trend(totals: &[Decimal]) -> CategoryTrend {
    let count = totals.len();

    if count < MINIMUM_MONTHS_FOR_TREND {
        return CategoryTrend {
            direction: TrendDirection::InsufficientData,
            percentage: 0.0,
        };
    }

    let older_average = mean_of_two(totals[0], totals[1]);
    let recent_average = mean_of_two(totals[count - 2], totals[count - 1]);

    let percentage = match (older_average, recent_average) {
        (Some(older_average), _) if older_average.is_zero() => {
            return CategoryTrend {
                direction: TrendDirection::Stable,
                percentage: 0.0,
            };
        }
        (Some(older_average), Some(recent_average)) => {
            percent_change_from(older_average, recent_average)
        }
        // Only reachable for totals near the limits of Decimal.
        _ => {
            let older_average = (to_f64(totals[0]) + to_f64(totals[1])) / 2.0;
            let recent_average = (to_f64(totals[count - 2]) + to_f64(totals[count - 1])) / 2.0;
            (recent_average - older_average) / older_average * 100.0
        }
    };
    let direction = if percentage > TREND_THRESHOLD_PERCENT {
        TrendDirection::Increasing
    } else if percentage < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    CategoryTrend {
        direction,
        percentage,
    }
}

/// The mean of two totals, `None` if their sum does not fit in a [Decimal].
fn mean_of_two(first: Decimal, second: Decimal) -> Option<Decimal> {
    first
        .checked_add(second)
        .and_then(|sum| sum.checked_div(Decimal::TWO))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// `(current - previous) / previous * 100`, with the zero clamp rule.
fn percent_change_from(previous: Decimal, current: Decimal) -> f64 {
    if previous.is_zero() {
        return if current.is_zero() { 0.0 } else { 100.0 };
    }

    current
        .checked_sub(previous)
        .and_then(|difference| difference.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|percent| percent.to_f64())
        .unwrap_or_else(|| {
            // Only reachable for totals near the limits of Decimal.
            (to_f64(current) - to_f64(previous)) / to_f64(previous) * 100.0
        })
}

// ============================================================================
// DASHBOARD SUMMARIES AND CHART SERIES
// ============================================================================

/// Calculates the headline totals for the selected transactions.
///
/// `selected_range` is the date range picked by the user. The daily average
/// spreads the expenses over its days, which may include days with no
/// transactions. Without a complete range the daily average is zero.
pub fn summarize(
    transactions: &[Transaction],
    selected_range: Option<DateRange>,
) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for transaction in transactions {
        if transaction.is_income() {
            summary.total_income = summary.total_income.saturating_add(transaction.amount);
        } else {
            summary.total_expenses = summary.total_expenses.saturating_add(transaction.amount);
        }
    }

    summary.net_balance = summary
        .total_income
        .saturating_sub(summary.total_expenses);
    summary.daily_average = match selected_range.map(|range| range.days()) {
        Some(days) if days > 0 => summary.total_expenses / Decimal::from(days),
        _ => Decimal::ZERO,
    };

    summary
}

/// Sums the amounts of each category, ordered by category name.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    totals_by_category(transactions)
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect()
}

/// Builds a month-by-category table of totals.
///
/// Every category gets one value per month with data, using zero for months
/// where the category has no transactions.
pub fn monthly_category_totals(transactions: &[Transaction]) -> MonthlyCategoryTable {
    let months: Vec<MonthKey> = distinct_months(transactions).into_iter().collect();

    let series = monthly_totals_by_category(transactions)
        .into_iter()
        .map(|(category, monthly_totals)| CategorySeries {
            category,
            values: months
                .iter()
                .map(|month| monthly_totals.get(month).copied().unwrap_or_default())
                .collect(),
        })
        .collect();

    MonthlyCategoryTable { months, series }
}

/// Calculates daily totals and their moving average for each category.
///
/// The moving average covers the current daily total and up to six before
/// it. Days without transactions are not observations, so the window spans
/// seven days with data rather than seven calendar days.
pub fn daily_trends(transactions: &[Transaction]) -> Vec<DailyTrendSeries> {
    let mut daily_totals: BTreeMap<&str, BTreeMap<Date, Decimal>> = BTreeMap::new();

    for transaction in transactions {
        let total = daily_totals
            .entry(transaction.category.as_str())
            .or_default()
            .entry(transaction.date)
            .or_default();
        *total = total.saturating_add(transaction.amount);
    }

    daily_totals
        .into_iter()
        .map(|(category, totals)| {
            let totals: Vec<(Date, Decimal)> = totals.into_iter().collect();
            let points = totals
                .iter()
                .enumerate()
                .map(|(index, &(date, amount))| {
                    let window = &totals[(index + 1).saturating_sub(MOVING_AVERAGE_WINDOW)..=index];
                    let sum = window
                        .iter()
                        .fold(Decimal::ZERO, |sum, (_, amount)| sum.saturating_add(*amount));

                    TrendPoint {
                        date,
                        amount,
                        moving_average: sum / Decimal::from(window.len()),
                    }
                })
                .collect();

            DailyTrendSeries {
                category: category.to_owned(),
                points,
            }
        })
        .collect()
}

// ============================================================================
// HELPERS
// ============================================================================

/// The earliest and latest dates in `transactions`.
fn date_span(transactions: &[Transaction]) -> Option<DateRange> {
    let start = transactions.iter().map(|transaction| transaction.date).min()?;
    let end = transactions.iter().map(|transaction| transaction.date).max()?;

    Some(DateRange { start, end })
}

/// Extracts unique months from transactions in chronological order.
fn distinct_months(transactions: &[Transaction]) -> BTreeSet<MonthKey> {
    transactions
        .iter()
        .map(|transaction| MonthKey::from_date(transaction.date))
        .collect()
}

fn totals_by_category(transactions: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for transaction in transactions {
        let total = totals.entry(transaction.category.clone()).or_default();
        *total = total.saturating_add(transaction.amount);
    }

    totals
}

/// Groups transactions by category and then month.
///
/// Only months in which the category has transactions appear in its map.
fn monthly_totals_by_category(
    transactions: &[Transaction],
) -> BTreeMap<String, BTreeMap<MonthKey, Decimal>> {
    let mut totals: BTreeMap<String, BTreeMap<MonthKey, Decimal>> = BTreeMap::new();

    for transaction in transactions {
        let total = totals
            .entry(transaction.category.clone())
            .or_default()
            .entry(MonthKey::from_date(transaction.date))
            .or_default();
        *total = total.saturating_add(transaction.amount);
    }

    totals
}
