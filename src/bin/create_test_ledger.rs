use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use rust_decimal::Decimal;
use time::{Date, Duration, Month};

use fintrack_rs::{
    store::{Backend, StoreConfig, TransactionStore},
    transaction::NewTransaction,
};

/// A utility for creating a test ledger for the fintrack dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the ledger to. A `.csv` extension creates a CSV
    /// ledger, anything else a SQLite database.
    #[arg(long, short)]
    output_path: PathBuf,
}

/// Create and populate a ledger for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = args.output_path.as_path();

    let Some(extension) = output_path.extension().filter(|ext| !ext.is_empty()) else {
        eprintln!("Output path must include a file extension (e.g., 'ledger.csv' or 'ledger.db').");
        exit(1);
    };

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let store = if extension.eq_ignore_ascii_case("csv") {
        println!("Creating CSV ledger at {output_path:#?}");
        csv_store(output_path)
    } else {
        println!("Creating SQLite ledger at {output_path:#?}");
        let store = TransactionStore::connect(StoreConfig {
            database_path: Some(output_path.to_owned()),
            csv_path: output_path.with_extension("csv"),
        });

        if store.backend() != Backend::Relational {
            eprintln!("Could not create a database at {output_path:#?}.");
            exit(1);
        }

        store
    };

    println!("Creating test transactions...");

    let transactions = sample_transactions()?;
    for transaction in &transactions {
        store.append(transaction)?;
    }

    println!("Added {} transactions. Success!", transactions.len());

    Ok(())
}

fn csv_store(path: &Path) -> TransactionStore {
    TransactionStore::connect(StoreConfig {
        database_path: None,
        csv_path: path.to_owned(),
    })
}

/// Six months of income and expenses, with rent rising and dining out falling.
fn sample_transactions() -> Result<Vec<NewTransaction>, Box<dyn Error>> {
    let mut transactions = Vec::new();

    for (offset, month) in [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ]
    .into_iter()
    .enumerate()
    {
        let step = offset as i64;
        let day = |day: u8| Date::from_calendar_date(2024, month, day);

        transactions.push(NewTransaction::new(
            day(5)?,
            "Income",
            Decimal::new(300_000, 2),
            Some("Paycheck"),
        )?);
        transactions.push(NewTransaction::new(
            day(10)?,
            "Rent",
            Decimal::new(120_000 + step * 5_000, 2),
            None,
        )?);
        transactions.push(NewTransaction::new(
            day(15)?,
            "Utilities",
            Decimal::new(14_250 + (step % 2) * 1_500, 2),
            Some("Power and internet"),
        )?);
        transactions.push(NewTransaction::new(
            day(20)?,
            "Dining",
            Decimal::new(18_000 - step * 2_000, 2),
            None,
        )?);

        let mut shop = day(1)?;
        while shop.month() == month {
            transactions.push(NewTransaction::new(
                shop,
                "Groceries",
                Decimal::new(8_540 + i64::from(shop.day()) * 25, 2),
                Some("Weekly shop"),
            )?);
            shop += Duration::days(7);
        }
    }

    Ok(transactions)
}
