use std::{error::Error, path::PathBuf};

use clap::Parser;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{
    dashboard::DashboardData,
    filter::TransactionFilter,
    store::{StoreConfig, TransactionStore},
    transaction::parse_date,
};

/// Print the dashboard aggregates of a ledger to the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the CSV ledger, used when the database is unavailable.
    #[arg(long)]
    csv_path: PathBuf,

    /// File path to the SQLite ledger.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// The first day to include, e.g. 2024-01-01.
    #[arg(long)]
    start_date: Option<String>,

    /// The last day to include, e.g. 2024-12-31.
    #[arg(long)]
    end_date: Option<String>,

    /// A category to include, may be repeated. All categories if omitted.
    #[arg(long = "category")]
    categories: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter::LevelFilter::WARN),
        )
        .init();

    let args = Args::parse();

    let filter = TransactionFilter {
        start_date: args.start_date.as_deref().map(parse_date).transpose()?,
        end_date: args.end_date.as_deref().map(parse_date).transpose()?,
        categories: args.categories.into_iter().collect(),
    };

    let store = TransactionStore::connect(StoreConfig {
        database_path: args.db_path,
        csv_path: args.csv_path,
    });
    let data = DashboardData::build(store.load(), &filter);

    print_report(&data);

    Ok(())
}

fn print_report(data: &DashboardData) {
    println!(
        "Read {} transactions from the {:?} ledger",
        data.transaction_count, data.backend
    );
    if !data.diagnostics.is_empty() {
        println!("{} problems while loading:", data.diagnostics.len());
        for diagnostic in &data.diagnostics {
            println!("  {diagnostic:?}");
        }
    }

    println!("\nSummary");
    println!("  Income:        {:>12.2}", data.summary.total_income);
    println!("  Expenses:      {:>12.2}", data.summary.total_expenses);
    println!("  Net balance:   {:>12.2}", data.summary.net_balance);
    println!("  Daily average: {:>12.2}", data.summary.daily_average);

    println!("\nMonthly");
    for stats in &data.monthly_stats {
        println!(
            "  {}  income {:>10.2}  expenses {:>10.2}  net {:>10.2}",
            stats.month, stats.income, stats.expenses, stats.net
        );
    }

    println!("\nMonth-over-month changes");
    for (category, change) in &data.percentage_changes {
        println!("  {category}: {change:+.1}%");
    }

    println!("\nDaily averages");
    for (category, average) in &data.daily_averages {
        println!("  {category}: ${average:.2}/day");
    }

    println!("\nTrends");
    for (category, trend) in &data.trends {
        println!(
            "  {category}: {:?} ({:+.1}%)",
            trend.direction, trend.percentage
        );
    }
}
