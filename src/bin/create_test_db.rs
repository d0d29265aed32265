use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use tracker::initialize_db;

/// A utility for creating a database filled with sample budget data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const CATEGORIES: [(&str, &[&str]); 3] = [
    ("Bills", &["Power", "Internet"]),
    ("Food", &["Groceries", "Takeaways"]),
    ("Fun", &[]),
];

const PAYEES: [(&str, &str, &str); 5] = [
    ("Power", "Mercury", "45.20"),
    ("Internet", "Orcon", "89.99"),
    ("Groceries", "Countdown", "132.50"),
    ("Takeaways", "Hell Pizza", "28.00"),
    ("Fun", "Event Cinemas", "19.50"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let today = OffsetDateTime::now_utc().date();
    let sql_transaction = conn.unchecked_transaction()?;

    println!("Creating accounts...");
    sql_transaction.execute(
        "INSERT INTO account (name, kind, budget_kind) VALUES
            ('Everyday', 'Checking', 'Budget'),
            ('Savings', 'Savings', 'Budget'),
            ('KiwiSaver', 'InvestmentAccount', 'OffBudget')",
        (),
    )?;
    let everyday_id: i64 = sql_transaction.query_row(
        "SELECT id FROM account WHERE name = 'Everyday'",
        [],
        |row| row.get(0),
    )?;

    println!("Creating categories...");
    for (root, children) in CATEGORIES {
        sql_transaction.execute("INSERT INTO category (name) VALUES (?1)", [root])?;
        let root_id = sql_transaction.last_insert_rowid();

        for child in children {
            sql_transaction.execute(
                "INSERT INTO category (name, parent_id) VALUES (?1, ?2)",
                (child, root_id),
            )?;
        }
    }

    println!("Creating envelopes and transactions for the last three months...");
    for months_ago in 0..3_i64 {
        let month_index =
            i64::from(today.year()) * 12 + i64::from(today.month() as u8) - 1 - months_ago;
        let month = format!("{:04}-{:02}", month_index / 12, month_index % 12 + 1);

        sql_transaction.execute(
            "INSERT INTO envelope (month, budgeted, category_id)
             SELECT ?1, '100', id FROM category",
            [&month],
        )?;

        sql_transaction.execute(
            "INSERT INTO financial_transaction
                (posted_on, payee, amount, direction, account_id, cleared_status)
             VALUES (?1, 'Employer', '2500', 'Inflow', ?2, 'Cleared')",
            (format!("{month}-01"), everyday_id),
        )?;

        for (category, payee, amount) in PAYEES {
            sql_transaction.execute(
                "INSERT INTO financial_transaction
                    (posted_on, payee, amount, direction, account_id, category_id, cleared_status)
                 SELECT ?1, ?2, ?3, 'Outflow', ?4, id, 'Cleared' FROM category WHERE name = ?5",
                (format!("{month}-10"), payee, amount, everyday_id, category),
            )?;
        }

        // Left uncategorized so auto-categorization has something to do.
        sql_transaction.execute(
            "INSERT INTO financial_transaction
                (posted_on, payee, amount, direction, account_id)
             VALUES (?1, 'Countdown', '54.10', 'Outflow', ?2)",
            (format!("{month}-20"), everyday_id),
        )?;
    }

    sql_transaction.commit()?;

    println!("Success!");

    Ok(())
}
