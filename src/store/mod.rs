//! Loading and appending transactions with a relational store and a flat-file
//! fallback.
//!
//! Whether the relational store is usable is decided once, when the
//! [TransactionStore] is constructed, and kept as an immutable field. After
//! that, any relational read or insert that fails falls back to the flat file
//! for that call only. Store failures are logged and reported as
//! [Diagnostic]s, they are never fatal.

mod columns;
mod flat_file;
mod sqlite;

#[cfg(test)]
pub(crate) mod test_utils;

use std::path::PathBuf;

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    transaction::{NewTransaction, Transaction},
};

pub use flat_file::CsvLedger;
pub use sqlite::{SqliteLedger, create_transaction_table};

/// Where the store should look for the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// The SQLite database to prefer, `None` to use the flat file only.
    pub database_path: Option<PathBuf>,
    /// The CSV file used as the fallback.
    pub csv_path: PathBuf,
}

/// The backend that served a read or accepted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// The SQLite `transactions` table.
    Relational,
    /// The CSV file.
    FlatFile,
}

/// A problem the store recovered from while loading the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The relational read failed and the flat file was read instead.
    RelationalReadFailed {
        /// The underlying error.
        reason: String,
    },
    /// The flat file could not be read, so the ledger is empty.
    FlatFileUnreadable {
        /// The underlying error.
        reason: String,
    },
    /// A stored row was skipped because it does not describe a valid transaction.
    MalformedRow {
        /// The one-based data row number within its source.
        row: usize,
        /// Why the row was rejected.
        reason: String,
    },
}

/// The result of loading the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// The transactions that parsed successfully.
    pub transactions: Vec<Transaction>,
    /// The backend the transactions were read from.
    pub source: Backend,
    /// Problems that were recovered from while loading.
    pub diagnostics: Vec<Diagnostic>,
}

impl Ledger {
    /// The number of stored rows that were skipped as malformed.
    pub fn skipped_rows(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| matches!(diagnostic, Diagnostic::MalformedRow { .. }))
            .count()
    }

    /// The unique categories in the order they first appear.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();

        for transaction in &self.transactions {
            if !categories.contains(&transaction.category) {
                categories.push(transaction.category.clone());
            }
        }

        categories
    }
}

/// Loads and appends transactions, preferring SQLite and falling back to CSV.
#[derive(Debug)]
pub struct TransactionStore {
    relational: Option<SqliteLedger>,
    flat_file: CsvLedger,
}

impl TransactionStore {
    /// Create a store and probe the relational backend once.
    ///
    /// If `config.database_path` is `None` or the database cannot be opened,
    /// the store uses the flat file for the rest of its life.
    pub fn connect(config: StoreConfig) -> Self {
        let relational = match &config.database_path {
            Some(path) => match SqliteLedger::open(path) {
                Ok(ledger) => {
                    tracing::info!("Connected to the SQLite ledger at {}", path.display());
                    Some(ledger)
                }
                Err(error) => {
                    tracing::warn!(
                        "SQLite ledger at {} is not available, using the CSV fallback: {error}",
                        path.display()
                    );
                    None
                }
            },
            None => {
                tracing::info!("No database configured, using the CSV ledger");
                None
            }
        };

        Self {
            relational,
            flat_file: CsvLedger::new(config.csv_path),
        }
    }

    /// Create a store from an already open connection, e.g. an in-memory database.
    ///
    /// The connection is probed the same way as in [TransactionStore::connect].
    pub fn with_connection(connection: Connection, csv_path: impl Into<PathBuf>) -> Self {
        let relational = match SqliteLedger::from_connection(connection) {
            Ok(ledger) => Some(ledger),
            Err(error) => {
                tracing::warn!("SQLite ledger is not available, using the CSV fallback: {error}");
                None
            }
        };

        Self {
            relational,
            flat_file: CsvLedger::new(csv_path),
        }
    }

    /// The backend chosen when the store was created.
    pub fn backend(&self) -> Backend {
        if self.relational.is_some() {
            Backend::Relational
        } else {
            Backend::FlatFile
        }
    }

    /// The flat file used as the fallback.
    pub fn flat_file(&self) -> &CsvLedger {
        &self.flat_file
    }

    /// Load every transaction in the ledger.
    ///
    /// Malformed rows are skipped and reported in [Ledger::diagnostics].
    pub fn load(&self) -> Ledger {
        let mut diagnostics = Vec::new();

        if let Some(relational) = &self.relational {
            match relational.read() {
                Ok(rows) => {
                    let rows = rows.into_iter().map(Ok).collect();
                    let transactions = parse_rows(rows, &mut diagnostics);

                    return Ledger {
                        transactions,
                        source: Backend::Relational,
                        diagnostics,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        "Error loading from the SQLite ledger, falling back to CSV: {error}"
                    );
                    diagnostics.push(Diagnostic::RelationalReadFailed {
                        reason: error.to_string(),
                    });
                }
            }
        }

        let transactions = match self.flat_file.read() {
            Ok(rows) => parse_rows(rows, &mut diagnostics),
            Err(error) => {
                tracing::error!(
                    "Could not read the CSV ledger at {}: {error}",
                    self.flat_file.path().display()
                );
                diagnostics.push(Diagnostic::FlatFileUnreadable {
                    reason: error.to_string(),
                });
                Vec::new()
            }
        };

        Ledger {
            transactions,
            source: Backend::FlatFile,
            diagnostics,
        }
    }

    /// Append one transaction to the ledger.
    ///
    /// Returns the backend that accepted the row.
    ///
    /// # Errors
    /// Returns an error only if the flat-file write fails, see
    /// [CsvLedger] for details. Relational failures fall back to the flat file.
    pub fn append(&self, transaction: &NewTransaction) -> Result<Backend, Error> {
        if let Some(relational) = &self.relational {
            match relational.insert(transaction) {
                Ok(()) => return Ok(Backend::Relational),
                Err(error) => {
                    tracing::warn!(
                        "Error inserting into the SQLite ledger, writing to CSV instead: {error}"
                    );
                }
            }
        }

        self.flat_file.append(transaction)?;

        Ok(Backend::FlatFile)
    }
}

fn parse_rows(
    rows: Vec<Result<columns::RawRow, Error>>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        match row.and_then(|row| row.into_transaction(index + 1)) {
            Ok(transaction) => transactions.push(transaction),
            Err(Error::MalformedRow { row, reason }) => {
                tracing::warn!("Skipping malformed ledger row {row}: {reason}");
                diagnostics.push(Diagnostic::MalformedRow { row, reason });
            }
            Err(error) => {
                tracing::warn!("Skipping malformed ledger row {}: {error}", index + 1);
                diagnostics.push(Diagnostic::MalformedRow {
                    row: index + 1,
                    reason: error.to_string(),
                });
            }
        }
    }

    transactions
}
