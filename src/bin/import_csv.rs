use std::{error::Error, fs::File, path::PathBuf, process::exit};

use clap::Parser;
use rusqlite::Connection;

use tracker::{bulk_import_csv, initialize_db};

/// Load the rows of a CSV file into one of the tracker database's tables.
///
/// The first line of the file names the columns. Fields are split on commas
/// and inserted as-is.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "TRACKER_DB_PATH")]
    db_path: String,

    /// The table to insert the rows into, e.g. "financial_transaction".
    #[arg(long, short)]
    table: String,

    /// The CSV file to read.
    #[arg(long, short)]
    file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !args.file.is_file() {
        eprintln!("No file found at {:#?}", args.file);
        exit(1);
    }

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let file = File::open(&args.file)?;
    let row_count = bulk_import_csv(&args.table, file, &connection)?;

    println!("Inserted {row_count} rows into {}", args.table);

    Ok(())
}
