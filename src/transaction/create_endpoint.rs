//! Defines the endpoint for adding a new transaction to the ledger.
use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, store::TransactionStore, transaction::NewTransaction};

/// The state needed to add a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The ledger to append to.
    pub store: Arc<TransactionStore>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The form data for adding a transaction.
///
/// Every field is optional so that missing fields can be reported as
/// validation errors instead of rejected by the extractor.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TransactionForm {
    /// The date when the transaction occurred, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// The category label.
    pub category: Option<String>,
    /// The amount as decimal text.
    pub amount: Option<String>,
    /// Text detailing the transaction.
    pub description: Option<String>,
}

/// Whether a client-side field should be replaced or left as it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate<T> {
    /// Keep the client's current value.
    Unchanged,
    /// Replace the client's value.
    Set(T),
}

/// The response to an attempt to add a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddTransactionOutcome {
    /// A message describing the result, shown to the user.
    pub message: String,
    /// The categories offered by the category pickers.
    pub category_options: FieldUpdate<Vec<String>>,
    /// The categories selected in the dashboard filter.
    pub selected_categories: FieldUpdate<Vec<String>>,
}

impl AddTransactionOutcome {
    fn added(categories: Vec<String>) -> Self {
        Self {
            message: "Transaction added successfully!".to_owned(),
            category_options: FieldUpdate::Set(categories.clone()),
            selected_categories: FieldUpdate::Set(categories),
        }
    }

    fn failed(error: &Error) -> Self {
        Self {
            message: format!("Error: {error}"),
            category_options: FieldUpdate::Unchanged,
            selected_categories: FieldUpdate::Unchanged,
        }
    }
}

/// A route handler for adding a new transaction.
///
/// On success the category lists are replaced with the categories of the
/// reloaded ledger, so the new category is both offered and selected. On
/// failure both lists are left unchanged and the status is 400 for invalid
/// input or 500 for storage errors.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match NewTransaction::parse(
        form.date.as_deref(),
        form.category.as_deref(),
        form.amount.as_deref(),
        form.description.as_deref(),
    ) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("rejected new transaction: {error}");
            return failure_response(error);
        }
    };

    if let Err(error) = state.store.append(&transaction) {
        tracing::error!("could not add transaction: {error}");
        return failure_response(error);
    }

    let categories = state.store.load().categories();

    (StatusCode::OK, Json(AddTransactionOutcome::added(categories))).into_response()
}

fn failure_response(error: Error) -> Response {
    (error.status_code(), Json(AddTransactionOutcome::failed(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        dashboard::DashboardData,
        endpoints,
        filter::TransactionFilter,
        store::{StoreConfig, test_utils::TempPath},
        transaction::create_transaction_endpoint,
    };

    use super::TransactionForm;

    fn get_test_server(path: &TempPath) -> (TestServer, AppState) {
        let state = AppState::new(StoreConfig {
            database_path: None,
            csv_path: path.as_path().to_owned(),
        });
        let app = Router::new()
            .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
        )
    }

    fn form(date: &str, category: &str, amount: &str) -> TransactionForm {
        TransactionForm {
            date: Some(date.to_owned()),
            category: Some(category.to_owned()),
            amount: Some(amount.to_owned()),
            description: None,
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let path = TempPath::new("ledger.csv");
        fs::write(
            path.as_path(),
            "date,category,amount,description\n2024-01-05,Income,3000,\n",
        )
        .unwrap();
        let (server, state) = get_test_server(&path);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&TransactionForm {
                description: Some("Weekly shop".to_owned()),
                ..form("2024-01-16", "Groceries", "85.40")
            })
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Transaction added successfully!");
        assert_eq!(
            body["category_options"],
            json!({"status": "set", "value": ["Income", "Groceries"]})
        );
        assert_eq!(body["selected_categories"], body["category_options"]);

        let ledger = state.store.load();
        assert_eq!(ledger.transactions.len(), 2);
        assert_eq!(ledger.transactions[1].amount, Decimal::new(8540, 2));
        assert_eq!(
            ledger.transactions[1].description.as_deref(),
            Some("Weekly shop")
        );
    }

    #[tokio::test]
    async fn invalid_amount_leaves_fields_unchanged() {
        let path = TempPath::new("ledger.csv");
        let (server, state) = get_test_server(&path);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&form("2024-01-16", "Groceries", "lots"))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["category_options"], json!({"status": "unchanged"}));
        assert_eq!(body["selected_categories"], json!({"status": "unchanged"}));
        assert!(body["message"].as_str().unwrap().contains("lots"));
        assert!(state.store.load().transactions.is_empty());
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_and_dashboard_still_loads() {
        let path = TempPath::new("ledger.csv");
        let (server, state) = get_test_server(&path);

        for _ in 0..2 {
            server
                .post(endpoints::TRANSACTIONS_API)
                .form(&form("2024-01-16", "Rent", "50000000000000000000000000000"))
                .await
                .assert_status_bad_request();
        }

        let ledger = state.store.load();
        assert!(ledger.transactions.is_empty());
        assert!(DashboardData::build(ledger, &TransactionFilter::default()).monthly_stats.is_empty());
    }

    #[tokio::test]
    async fn missing_category_is_rejected() {
        let path = TempPath::new("ledger.csv");
        let (server, _state) = get_test_server(&path);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&TransactionForm {
                category: None,
                ..form("2024-01-16", "", "10")
            })
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("category"));
    }

    #[tokio::test]
    async fn blank_category_is_rejected() {
        let path = TempPath::new("ledger.csv");
        let (server, state) = get_test_server(&path);

        server
            .post(endpoints::TRANSACTIONS_API)
            .form(&form("2024-01-16", "   ", "10"))
            .await
            .assert_status_bad_request();

        assert!(!path.as_path().exists());
        assert!(state.store.load().transactions.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_is_internal_server_error() {
        let path = TempPath::new("ledger.csv");
        // A directory where the file should be makes the append fail.
        fs::create_dir_all(path.as_path()).unwrap();
        let (server, _state) = get_test_server(&path);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&form("2024-01-16", "Groceries", "10"))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["category_options"], json!({"status": "unchanged"}));
    }
}
