//! The API endpoints URIs.

/// The route to request a cup of coffee, used as a health probe.
pub const COFFEE: &str = "/coffee";
/// The route for the aggregated dashboard data.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// The route to list and add transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to list the categories in the ledger.
pub const CATEGORIES_API: &str = "/api/categories";
