//! Dashboard HTTP handlers.
//!
//! This module contains:
//! - Route handlers for the dashboard data, the filtered transactions and the
//!   category list
//! - The query type shared by the filtered routes
//! - [DashboardData], the full set of aggregates for one filter selection

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{FromRef, State},
};
// axum_extra's Query collects repeated keys, e.g. `categories=A&categories=B`.
use axum_extra::extract::Query;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    dashboard::aggregation::{
        CategoryTotal, CategoryTrend, DailyTrendSeries, DashboardSummary, MonthlyCategoryTable,
        MonthlyStats, category_totals, daily_averages, daily_trends, monthly_category_totals,
        monthly_stats, percentage_changes, summarize, trend_directions,
    },
    filter::TransactionFilter,
    store::{Backend, Diagnostic, Ledger, TransactionStore},
    transaction::{Transaction, parse_date},
};

/// The state needed for the dashboard routes.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The ledger to aggregate.
    pub store: Arc<TransactionStore>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The filter selection sent as query parameters.
///
/// Dates are kept as text so that invalid dates can be answered with a JSON
/// error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DashboardQuery {
    /// The first day to include, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day to include, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// The categories to include, all categories if empty.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl DashboardQuery {
    /// Validate the query and turn it into a [TransactionFilter].
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if either date is not a valid date.
    pub fn into_filter(self) -> Result<TransactionFilter, Error> {
        let parse = |text: Option<String>| {
            text.filter(|text| !text.trim().is_empty())
                .map(|text| parse_date(&text))
                .transpose()
        };

        Ok(TransactionFilter {
            start_date: parse(self.start_date)?,
            end_date: parse(self.end_date)?,
            categories: self
                .categories
                .into_iter()
                .filter(|category| !category.trim().is_empty())
                .collect(),
        })
    }
}

/// Every aggregate shown on the dashboard for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    /// Totals and the daily average for the selected range.
    pub summary: DashboardSummary,
    /// Income, expenses and net per month.
    pub monthly_stats: Vec<MonthlyStats>,
    /// Month-over-month change per category, in percent.
    pub percentage_changes: BTreeMap<String, f64>,
    /// Average amount per day per category.
    pub daily_averages: BTreeMap<String, Decimal>,
    /// Trend direction per category.
    pub trends: BTreeMap<String, CategoryTrend>,
    /// Total per category.
    pub category_totals: Vec<CategoryTotal>,
    /// Month-by-category totals.
    pub monthly_category_totals: MonthlyCategoryTable,
    /// Daily totals and moving averages per category.
    pub daily_trends: Vec<DailyTrendSeries>,
    /// The number of transactions that passed the filters.
    pub transaction_count: usize,
    /// The backend the ledger was read from.
    pub backend: Backend,
    /// Problems recovered from while loading the ledger.
    pub diagnostics: Vec<Diagnostic>,
}

impl DashboardData {
    /// Filter `ledger` and compute every dashboard aggregate.
    pub fn build(ledger: Ledger, filter: &TransactionFilter) -> Self {
        let transactions = filter.apply(&ledger.transactions);

        Self {
            summary: summarize(&transactions, filter.date_range()),
            monthly_stats: monthly_stats(&transactions),
            percentage_changes: percentage_changes(&transactions),
            daily_averages: daily_averages(&transactions),
            trends: trend_directions(&transactions),
            category_totals: category_totals(&transactions),
            monthly_category_totals: monthly_category_totals(&transactions),
            daily_trends: daily_trends(&transactions),
            transaction_count: transactions.len(),
            backend: ledger.source,
            diagnostics: ledger.diagnostics,
        }
    }
}

/// Get the dashboard aggregates for the selected filters.
pub async fn get_dashboard_data(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardData>, Error> {
    let filter = query.into_filter()?;
    let ledger = state.store.load();

    if ledger.skipped_rows() > 0 {
        tracing::warn!("{} ledger rows were skipped", ledger.skipped_rows());
    }

    Ok(Json(DashboardData::build(ledger, &filter)))
}

/// Get the transactions that pass the selected filters.
pub async fn get_transactions(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = query.into_filter()?;
    let ledger = state.store.load();

    Ok(Json(filter.apply(&ledger.transactions)))
}

/// Get the categories in the ledger in the order they first appear.
pub async fn get_categories(State(state): State<DashboardState>) -> Json<Vec<String>> {
    Json(state.store.load().categories())
}
