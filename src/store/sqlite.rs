//! The relational ledger backend, a `transactions` table in a SQLite database.

use std::{path::Path, sync::Mutex};

use rusqlite::{Connection, types::Value};

use crate::{
    Error,
    store::columns::{ColumnMap, RawRow},
    transaction::NewTransaction,
};

/// Stores transactions in a SQLite database.
#[derive(Debug)]
pub struct SqliteLedger {
    connection: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open the database at `path` and check that it is usable.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the database cannot be opened, the table
    /// cannot be created, or the probe query fails.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        Self::from_connection(connection)
    }

    /// Wrap an open connection, creating the table if needed and probing it.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the table cannot be created or the probe
    /// query fails.
    pub fn from_connection(connection: Connection) -> Result<Self, Error> {
        create_transaction_table(&connection)?;
        connection.query_row("SELECT COUNT(*) FROM transactions", [], |row| {
            row.get::<_, i64>(0)
        })?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Read every row of the table.
    ///
    /// Column names are matched case-insensitively so that tables created by
    /// other tools with `Date`, `Category`, ... columns are readable.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the query fails, [Error::MissingColumn]
    /// if the table lacks a required column, or [Error::DatabaseLockError] if
    /// the connection lock is poisoned.
    pub(super) fn read(&self) -> Result<Vec<RawRow>, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let mut stmt = connection.prepare("SELECT * FROM transactions")?;
        let columns = ColumnMap::from_headers(stmt.column_names())?;

        let rows = stmt
            .query_map([], |row| {
                let mut fields = Vec::with_capacity(columns.width);
                for index in 0..columns.width {
                    fields.push(value_to_text(row.get(index)?));
                }
                Ok(fields)
            })?
            .collect::<Result<Vec<Vec<String>>, rusqlite::Error>>()?;

        Ok(rows
            .iter()
            .map(|fields| {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                RawRow::from_fields(&fields, &columns)
            })
            .collect())
    }

    /// Insert one transaction.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the insert fails or
    /// [Error::DatabaseLockError] if the connection lock is poisoned.
    pub(super) fn insert(&self, transaction: &NewTransaction) -> Result<(), Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection.execute(
            "INSERT INTO transactions (date, category, amount, description)
             VALUES (?1, ?2, ?3, ?4)",
            (
                transaction.date(),
                transaction.category(),
                transaction.amount().to_string(),
                transaction.description(),
            ),
        )?;

        Ok(())
    }
}

/// Create the transactions table in the database.
///
/// Amounts are stored as text to keep the decimal value exactly as entered.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Render a column value as text, whatever type affinity the table used.
fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(number) => number.to_string(),
        Value::Real(number) => number.to_string(),
        Value::Text(text) => text,
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, transaction::NewTransaction};

    use super::SqliteLedger;

    fn get_test_ledger() -> SqliteLedger {
        let conn = Connection::open_in_memory().unwrap();
        SqliteLedger::from_connection(conn).unwrap()
    }

    #[test]
    fn insert_then_read_round_trips() {
        let ledger = get_test_ledger();
        let transaction = NewTransaction::new(
            date!(2024 - 01 - 15),
            "Income",
            Decimal::new(300000, 2),
            Some("Paycheck"),
        )
        .unwrap();

        ledger.insert(&transaction).unwrap();
        let rows = ledger.read().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-01-15");
        assert_eq!(rows[0].category, "Income");
        assert_eq!(rows[0].amount, "3000.00");
        assert_eq!(rows[0].description.as_deref(), Some("Paycheck"));
    }

    #[test]
    fn reads_foreign_table_with_real_amounts() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE transactions (\"Date\" TIMESTAMP, \"Category\" TEXT, \"Amount\" REAL, \"Description\" TEXT)",
            (),
        )
        .unwrap();
        conn.execute(
            "INSERT INTO transactions VALUES ('2024-01-16 00:00:00', 'Groceries', 85.4, NULL)",
            (),
        )
        .unwrap();
        let ledger = SqliteLedger::from_connection(conn).unwrap();

        let rows = ledger.read().unwrap();
        let transaction = rows[0].clone().into_transaction(1).unwrap();

        assert_eq!(transaction.date, date!(2024 - 01 - 16));
        assert_eq!(transaction.amount, Decimal::new(854, 1));
        assert_eq!(transaction.description, None);
    }

    #[test]
    fn read_fails_when_table_is_missing_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE transactions (date TEXT, category TEXT)", ())
            .unwrap();
        let ledger = SqliteLedger::from_connection(conn).unwrap();

        assert_eq!(ledger.read(), Err(Error::MissingColumn("amount")));
    }

    #[test]
    fn open_fails_for_unreachable_path() {
        let result = SqliteLedger::open(std::path::Path::new(
            "/this/directory/does/not/exist/ledger.db",
        ));

        assert!(result.is_err());
    }
}
