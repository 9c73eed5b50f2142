//! The canonical ledger schema and the mapping from foreign column names to it.
//!
//! Ledgers written by other tools may capitalize their headers differently
//! (`Date`, `CATEGORY`, ` Amount `). Renaming happens here, at the store
//! boundary, so the rest of the crate only sees [Transaction].

use crate::{
    Error,
    transaction::{Transaction, parse_amount, parse_date},
};

/// The header row written to new flat files, in column order.
pub(super) const CANONICAL_HEADER: [&str; 4] = ["date", "category", "amount", "description"];

/// The positions of the canonical columns within a source's columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ColumnMap {
    pub date: usize,
    pub category: usize,
    pub amount: usize,
    pub description: Option<usize>,
    /// The total number of columns in the source.
    pub width: usize,
}

impl ColumnMap {
    /// Locate the canonical columns by case-insensitive, trimmed name.
    ///
    /// Unknown columns are ignored. When a name appears more than once the
    /// first occurrence wins.
    ///
    /// # Errors
    /// Returns [Error::MissingColumn] if the date, category or amount column
    /// cannot be found.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, Error> {
        let mut date = None;
        let mut category = None;
        let mut amount = None;
        let mut description = None;
        let mut width = 0;

        for (index, header) in headers.into_iter().enumerate() {
            width = index + 1;

            let slot = match header.trim().to_lowercase().as_str() {
                "date" => &mut date,
                "category" => &mut category,
                "amount" => &mut amount,
                "description" => &mut description,
                _ => continue,
            };

            slot.get_or_insert(index);
        }

        Ok(Self {
            date: date.ok_or(Error::MissingColumn("date"))?,
            category: category.ok_or(Error::MissingColumn("category"))?,
            amount: amount.ok_or(Error::MissingColumn("amount"))?,
            description,
            width,
        })
    }

    /// Lay out the fields of a transaction in the source's column order.
    ///
    /// Columns the ledger does not know about are left empty.
    pub fn layout(&self, transaction: &Transaction) -> Vec<String> {
        let mut record = vec![String::new(); self.width];

        record[self.date] = transaction.date.to_string();
        record[self.category] = transaction.category.clone();
        record[self.amount] = transaction.amount.to_string();

        if let (Some(index), Some(description)) = (self.description, &transaction.description) {
            record[index] = description.clone();
        }

        record
    }
}

/// The text of one stored row, already mapped onto the canonical columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawRow {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: Option<String>,
}

impl RawRow {
    /// Pick the canonical fields out of a row of text fields.
    ///
    /// Missing trailing fields are read as empty strings.
    pub fn from_fields<'a>(fields: &[&'a str], columns: &ColumnMap) -> Self {
        let field = |index: usize| fields.get(index).copied().unwrap_or_default().to_owned();

        Self {
            date: field(columns.date),
            category: field(columns.category),
            amount: field(columns.amount),
            description: columns.description.map(field),
        }
    }

    /// Parse the row into a transaction.
    ///
    /// `row` is the one-based data row number used in the error.
    ///
    /// # Errors
    /// Returns [Error::MalformedRow] if the date or amount does not parse or
    /// the category is empty.
    pub fn into_transaction(self, row: usize) -> Result<Transaction, Error> {
        let malformed = |reason: String| Error::MalformedRow { row, reason };

        let date = parse_date(&self.date).map_err(|error| malformed(error.to_string()))?;
        let amount = parse_amount(&self.amount).map_err(|error| malformed(error.to_string()))?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(malformed(Error::EmptyCategory.to_string()));
        }

        let description = self
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Ok(Transaction {
            date,
            category: category.to_owned(),
            amount,
            description,
        })
    }
}
