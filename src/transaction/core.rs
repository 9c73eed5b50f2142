//! Defines the core data models for transactions and the parsing rules for
//! their fields.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// The category that marks a transaction as money coming in.
///
/// Every other category is treated as an expense, regardless of the sign of
/// the stored amount.
pub const INCOME_CATEGORY: &str = "Income";

/// The largest magnitude accepted for a single amount, 10^15.
///
/// Sums of any realistic number of amounts under this limit fit in a
/// [Decimal].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions have no identity of their own: the ledger is an append-only
/// bag of rows that is grouped ad hoc by date, month and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the transaction happened.
    pub date: Date,
    /// A short label such as "Rent" or "Groceries".
    pub category: String,
    /// The amount of money as it was entered.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// This does not validate the fields, use [NewTransaction::new] for data
    /// coming from a user.
    pub fn new(date: Date, category: &str, amount: Decimal, description: Option<&str>) -> Self {
        Self {
            date,
            category: category.to_owned(),
            amount,
            description: description.map(str::to_owned),
        }
    }

    /// Whether the transaction counts as income rather than an expense.
    pub fn is_income(&self) -> bool {
        self.category == INCOME_CATEGORY
    }
}

/// A validated transaction that is ready to be appended to the ledger.
///
/// To create a `NewTransaction`, use [NewTransaction::new] which enforces
/// that the category is not empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    date: Date,
    category: String,
    amount: Decimal,
    description: Option<String>,
}

impl NewTransaction {
    /// Validate the fields of a transaction submitted by a user.
    ///
    /// The category and description are trimmed, and an empty description is
    /// stored as `None`.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategory] if `category` is empty after trimming or
    /// [Error::InvalidAmount] if `amount` is larger than [MAX_AMOUNT].
    pub fn new(
        date: Date,
        category: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Self, Error> {
        let category = category.trim();

        if category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if amount.abs() > MAX_AMOUNT {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        Ok(Self {
            date,
            category: category.to_owned(),
            amount,
            description,
        })
    }

    /// Parse and validate the raw text fields of a submitted form.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::MissingField] if the date, category or amount is missing or blank,
    /// - [Error::InvalidDate] if the date is not a valid `YYYY-MM-DD` date,
    /// - [Error::InvalidAmount] if the amount is not a finite number,
    /// - or [Error::EmptyCategory] if the category is blank.
    pub fn parse(
        date: Option<&str>,
        category: Option<&str>,
        amount: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, Error> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|text| !text.trim().is_empty())
        }

        let date = present(date).ok_or(Error::MissingField("date"))?;
        let category = present(category).ok_or(Error::MissingField("category"))?;
        let amount = present(amount).ok_or(Error::MissingField("amount"))?;

        Self::new(
            parse_date(date)?,
            category,
            parse_amount(amount)?,
            description,
        )
    }

    /// When the transaction happened.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The trimmed, non-empty category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The amount as entered.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The trimmed description, `None` if it was blank.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl From<NewTransaction> for Transaction {
    fn from(value: NewTransaction) -> Self {
        Self {
            date: value.date,
            category: value.category,
            amount: value.amount,
            description: value.description,
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a calendar date.
///
/// Only the first ten characters are used so that timestamps written by other
/// tools, e.g. `2024-01-15 00:00:00` or `2024-01-15T00:00:00`, are accepted.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` does not start with a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);

    let rest = text.get(10..).unwrap_or_default();
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return Err(Error::InvalidDate(text.to_owned()));
    }

    Date::parse(date_part, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Parse a monetary amount.
///
/// Plain decimals (`85.40`, `-12`) and scientific notation (`1.5e3`) are
/// accepted. `NaN`, infinities and non-numeric text are rejected.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `text` is not a finite number or its
/// magnitude is larger than [MAX_AMOUNT].
pub fn parse_amount(text: &str) -> Result<Decimal, Error> {
    let text = text.trim();

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .filter(|amount| amount.abs() <= MAX_AMOUNT)
        .ok_or_else(|| Error::InvalidAmount(text.to_owned()))
}
