//! Dashboard module
//!
//! Turns the filtered ledger into the summaries, comparisons and chart series
//! shown on the dashboard, and serves them as JSON.

mod aggregation;
mod handlers;
mod month;

pub use aggregation::{
    CategorySeries, CategoryTotal, CategoryTrend, DailyTrendSeries, DashboardSummary,
    MonthlyCategoryTable, MonthlyStats, TrendDirection, TrendPoint, category_totals,
    daily_averages, daily_trends, monthly_category_totals, monthly_stats, percentage_changes,
    summarize, trend_directions,
};
pub use handlers::{
    DashboardData, DashboardQuery, DashboardState, get_categories, get_dashboard_data,
    get_transactions,
};
pub use month::MonthKey;
