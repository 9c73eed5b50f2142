//! Transaction management for the dashboard.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction`
//! - Parsing rules for dates and amounts
//! - The endpoint for adding a transaction to the ledger

mod core;
mod create_endpoint;

pub use core::{
    INCOME_CATEGORY, MAX_AMOUNT, NewTransaction, Transaction, parse_amount, parse_date,
};
pub use create_endpoint::{AddTransactionOutcome, FieldUpdate, create_transaction_endpoint};
