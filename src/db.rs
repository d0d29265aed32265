//! Creates the application's tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    account::create_account_tables, category::create_category_table,
    envelope::create_envelope_table, transaction::create_transaction_tables,
};

/// The tables that make up the application's schema, in creation order.
pub const TABLE_NAMES: [&str; 7] = [
    "account_kind",
    "budget_kind",
    "account",
    "category",
    "envelope",
    "cleared_status",
    "financial_transaction",
];

/// Create all of the application's tables if they do not already exist and
/// turn on foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_tables(&transaction)?;
    create_category_table(&transaction)?;
    create_envelope_table(&transaction)?;
    create_transaction_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}
