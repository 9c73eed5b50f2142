//! Implements a struct that holds the state of the REST server.

use std::{path::PathBuf, sync::Arc};

use rusqlite::Connection;

use crate::store::{Backend, StoreConfig, TransactionStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ledger shared by all request handlers.
    pub store: Arc<TransactionStore>,
}

impl AppState {
    /// Create a new [AppState], probing the configured database once.
    ///
    /// If the database cannot be used, the state is still created and every
    /// request is served from the CSV file in `config`.
    pub fn new(config: StoreConfig) -> Self {
        let store = TransactionStore::connect(config);

        if store.backend() == Backend::FlatFile {
            tracing::info!(
                "Serving the ledger from {}",
                store.flat_file().path().display()
            );
        }

        Self {
            store: Arc::new(store),
        }
    }

    /// Create a new [AppState] from an open SQLite connection, e.g. an
    /// in-memory database, with `csv_path` as the fallback.
    pub fn with_connection(connection: Connection, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(TransactionStore::with_connection(connection, csv_path)),
        }
    }
}
