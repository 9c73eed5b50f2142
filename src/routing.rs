//! Application router configuration.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    dashboard::{get_categories, get_dashboard_data, get_transactions},
    endpoints,
    logging::logging_middleware,
    transaction::create_transaction_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::DASHBOARD_API, get(get_dashboard_data))
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions).post(create_transaction_endpoint),
        )
        .route(endpoints::CATEGORIES_API, get(get_categories))
        .with_state(state)
}

/// Wrap `router` with request tracing and request/response logging.
pub fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but errors are
        // already logged where they are converted into responses.
        .on_failure(());

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(tracing_layer)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        AppState, endpoints,
        store::{StoreConfig, test_utils::TempPath},
    };

    use super::{add_tracing_layer, build_router};

    fn get_test_state(path: &TempPath) -> AppState {
        AppState::new(StoreConfig {
            database_path: None,
            csv_path: path.as_path().to_owned(),
        })
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let path = TempPath::new("ledger.csv");
        let server = TestServer::try_new(build_router(get_test_state(&path)))
            .expect("Could not create test server.");

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let path = TempPath::new("ledger.csv");
        let server = TestServer::try_new(build_router(get_test_state(&path)))
            .expect("Could not create test server.");

        server.get("/api/budgets").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn tracing_layer_passes_responses_through() {
        let path = TempPath::new("ledger.csv");
        let router = add_tracing_layer(build_router(get_test_state(&path)));
        let server = TestServer::try_new(router).expect("Could not create test server.");

        let response = server.get(endpoints::CATEGORIES_API).await;

        response.assert_status_ok();
        response.assert_text("[]");
    }
}
