//! Defines the core data models and database queries for ledger entries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    category::CategoryId,
    database_id::DatabaseId,
    money::{decimal_to_sql, get_decimal},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a ledger entry.
pub type TransactionId = DatabaseId;

/// Whether money entered or left an account.
///
/// Amounts are always non-negative, the direction gives them their sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Inflow, Direction::Outflow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inflow => "Inflow",
            Direction::Outflow => "Outflow",
        }
    }

    /// `amount` with the sign this direction gives it in a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Direction::Inflow => amount,
            Direction::Outflow => -amount,
        }
    }
}

/// Whether a ledger entry has settled at the financial institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearedStatus {
    Cleared,
    Uncleared,
}

impl ClearedStatus {
    pub const ALL: [ClearedStatus; 2] = [ClearedStatus::Cleared, ClearedStatus::Uncleared];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClearedStatus::Cleared => "Cleared",
            ClearedStatus::Uncleared => "Uncleared",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not a direction"))
    }
}

impl FromStr for ClearedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClearedStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not a cleared status"))
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for ClearedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

impl ToSql for ClearedStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ClearedStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A single dated movement of money against an account.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction was posted to the account.
    pub posted_on: Date,
    /// Who was paid, or who paid.
    pub payee: String,
    /// The non-negative amount of money that moved.
    pub amount: Decimal,
    /// Whether the amount entered or left the account.
    pub direction: Direction,
    /// A free text note.
    pub memo: String,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category of the transaction, `None` means uncategorized.
    pub category_id: Option<CategoryId>,
    /// Whether the bank has settled the transaction.
    pub cleared_status: ClearedStatus,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Decimal,
        direction: Direction,
        posted_on: Date,
        payee: &str,
        account_id: AccountId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            posted_on,
            payee: payee.to_owned(),
            amount,
            direction,
            memo: String::new(),
            account_id,
            category_id: None,
            cleared_status: ClearedStatus::Uncleared,
        }
    }

    /// The amount signed by direction, inflows positive.
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// The mutable fields of a transaction, used for inserts and full replace updates.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub posted_on: Date,
    pub payee: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub memo: String,
    pub account_id: AccountId,
    pub category_id: Option<CategoryId>,
    pub cleared_status: ClearedStatus,
}

impl TransactionBuilder {
    pub fn memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_owned();
        self
    }

    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn cleared_status(mut self, cleared_status: ClearedStatus) -> Self {
        self.cleared_status = cleared_status;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount < Decimal::ZERO {
            return Err(Error::NegativeAmount);
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "id, posted_on, payee, amount, direction, memo, account_id, \
    category_id, cleared_status";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is below zero,
/// - or [Error::InvalidForeignKey] if the account or category does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO financial_transaction
                (posted_on, payee, amount, direction, memo, account_id, category_id, cleared_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.posted_on,
                builder.payee,
                decimal_to_sql(builder.amount),
                builder.direction,
                builder.memo,
                builder.account_id,
                builder.category_id,
                builder.cleared_status,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Returns `Ok(None)` if there is no transaction with that ID.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM financial_transaction WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve every transaction, oldest first.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM financial_transaction ORDER BY posted_on ASC, id ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transactions of one account, oldest first.
pub fn get_transactions_for_account(
    account_id: AccountId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM financial_transaction
             WHERE account_id = :account_id
             ORDER BY posted_on ASC, id ASC"
        ))?
        .query_map(&[(":account_id", &account_id)], map_transaction_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Replace every mutable field of the transaction `id`.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if `id` does not refer to a transaction.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    builder.validate()?;

    let rows_affected = connection.execute(
        "UPDATE financial_transaction
         SET posted_on = ?1, payee = ?2, amount = ?3, direction = ?4, memo = ?5,
             account_id = ?6, category_id = ?7, cleared_status = ?8
         WHERE id = ?9",
        (
            builder.posted_on,
            builder.payee,
            decimal_to_sql(builder.amount),
            builder.direction,
            builder.memo,
            builder.account_id,
            builder.category_id,
            builder.cleared_status,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Set the category of a single transaction.
pub fn set_transaction_category(
    id: TransactionId,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE financial_transaction SET category_id = ?1 WHERE id = ?2",
        (category_id, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Flag a transaction as an account's opening balance so it is not counted as income.
pub fn mark_opening_balance(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE financial_transaction SET is_opening_balance = 1 WHERE id = ?1",
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if `id` does not refer to a transaction.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM financial_transaction WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the cleared status lookup table and the transaction table.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cleared_status (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    for status in ClearedStatus::ALL {
        connection.execute(
            "INSERT OR IGNORE INTO cleared_status (name) VALUES (?1)",
            [status.as_str()],
        )?;
    }

    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS financial_transaction (
            id INTEGER PRIMARY KEY,
            posted_on TEXT NOT NULL,
            payee TEXT NOT NULL,
            amount TEXT NOT NULL,
            direction TEXT NOT NULL CHECK (direction IN ('Inflow', 'Outflow')),
            memo TEXT NOT NULL DEFAULT '',
            account_id INTEGER NOT NULL,
            category_id INTEGER,
            cleared_status TEXT NOT NULL DEFAULT 'Uncleared',
            is_opening_balance INTEGER NOT NULL DEFAULT 0 CHECK (is_opening_balance IN (0, 1)),
            FOREIGN KEY(account_id) REFERENCES account(id),
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL,
            FOREIGN KEY(cleared_status) REFERENCES cleared_status(name)
        );

        CREATE INDEX IF NOT EXISTS idx_financial_transaction_account
            ON financial_transaction(account_id);
        CREATE INDEX IF NOT EXISTS idx_financial_transaction_category_date
            ON financial_transaction(category_id, posted_on);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        posted_on: row.get(1)?,
        payee: row.get(2)?,
        amount: get_decimal(row, 3)?,
        direction: row.get(4)?,
        memo: row.get(5)?,
        account_id: row.get(6)?,
        category_id: row.get(7)?,
        cleared_status: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;

    use crate::account::{AccountId, AccountKind, BudgetKind, NewAccount, add_account};

    /// Create an account with no opening balance for tests that need somewhere to put entries.
    #[track_caller]
    pub fn must_create_account(name: &str, connection: &Connection) -> AccountId {
        add_account(
            NewAccount::new_unchecked(name, AccountKind::Checking, BudgetKind::Budget),
            None,
            connection,
        )
        .expect("could not create test account")
        .id
    }
}
