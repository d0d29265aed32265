//! Defines the account model and the database queries for accounts.

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
    account::balance::{AccountBalance, balance_for_account, balances_by_account},
    database_id::DatabaseId,
    transaction::{
        ClearedStatus, Direction, Transaction, create_transaction, mark_opening_balance,
    },
};

// ============================================================================
// MODELS
// ============================================================================

pub type AccountId = DatabaseId;

/// The payee given to the ledger entry that records an account's opening balance.
pub const OPENING_BALANCE_PAYEE: &str = "Initial Balance";

/// What sort of account money is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Cash,
    LineOfCredit,
    Paypal,
    MerchantAccount,
    InvestmentAccount,
    Mortgage,
    OtherAsset,
    OtherLoanOrLiability,
}

impl AccountKind {
    pub const ALL: [AccountKind; 11] = [
        AccountKind::Checking,
        AccountKind::Savings,
        AccountKind::CreditCard,
        AccountKind::Cash,
        AccountKind::LineOfCredit,
        AccountKind::Paypal,
        AccountKind::MerchantAccount,
        AccountKind::InvestmentAccount,
        AccountKind::Mortgage,
        AccountKind::OtherAsset,
        AccountKind::OtherLoanOrLiability,
    ];

    /// The name stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "CreditCard",
            AccountKind::Cash => "Cash",
            AccountKind::LineOfCredit => "LineOfCredit",
            AccountKind::Paypal => "Paypal",
            AccountKind::MerchantAccount => "MerchantAccount",
            AccountKind::InvestmentAccount => "InvestmentAccount",
            AccountKind::Mortgage => "Mortgage",
            AccountKind::OtherAsset => "OtherAsset",
            AccountKind::OtherLoanOrLiability => "OtherLoanOrLiability",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "Credit Card",
            AccountKind::Cash => "Cash",
            AccountKind::LineOfCredit => "Line of Credit",
            AccountKind::Paypal => "PayPal",
            AccountKind::MerchantAccount => "Merchant Account",
            AccountKind::InvestmentAccount => "Investment Account",
            AccountKind::Mortgage => "Mortgage",
            AccountKind::OtherAsset => "Other Asset",
            AccountKind::OtherLoanOrLiability => "Other Loan or Liability",
        }
    }
}

/// Whether an account's money counts towards the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetKind {
    /// Money that can be assigned to envelopes.
    Budget,
    /// Tracking only, e.g. a mortgage or an investment account.
    OffBudget,
}

impl BudgetKind {
    pub const ALL: [BudgetKind; 2] = [BudgetKind::Budget, BudgetKind::OffBudget];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetKind::Budget => "Budget",
            BudgetKind::OffBudget => "OffBudget",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetKind::Budget => "On Budget",
            BudgetKind::OffBudget => "Off Budget",
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not an account kind"))
    }
}

impl FromStr for BudgetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not a budget kind"))
    }
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

impl ToSql for BudgetKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// The fields a user chooses for an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    name: String,
    kind: AccountKind,
    budget_kind: BudgetKind,
}

impl NewAccount {
    /// Create the fields for an account.
    ///
    /// # Errors
    /// Returns [Error::EmptyAccountName] if `name` is empty or only whitespace.
    pub fn new(name: &str, kind: AccountKind, budget_kind: BudgetKind) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyAccountName);
        }

        Ok(Self::new_unchecked(name, kind, budget_kind))
    }

    /// Create the fields for an account without validating the name.
    pub fn new_unchecked(name: &str, kind: AccountKind, budget_kind: BudgetKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            budget_kind,
        }
    }
}

/// The starting balance recorded when an account is added.
///
/// A negative amount, e.g. for a credit card, is recorded as an outflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningBalance {
    pub amount: Decimal,
    pub date: Date,
}

/// A bank account, credit card, loan or other place money is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account, unique across all accounts.
    pub name: String,
    pub kind: AccountKind,
    pub budget_kind: BudgetKind,
    /// The sum of the account's ledger entries.
    pub balance: Decimal,
    /// The date of the most recent ledger entry.
    pub balance_date: Date,
}

/// An account row before its balance has been attached.
struct AccountRow {
    id: AccountId,
    name: String,
    kind: AccountKind,
    budget_kind: BudgetKind,
}

impl AccountRow {
    fn with_balance(self, balance: AccountBalance) -> Account {
        Account {
            id: self.id,
            name: self.name,
            kind: self.kind,
            budget_kind: self.budget_kind,
            balance: balance.balance,
            balance_date: balance.date,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_account_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account_kind (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS budget_kind (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
    )?;

    for kind in AccountKind::ALL {
        connection.execute(
            "INSERT OR IGNORE INTO account_kind (name) VALUES (?1)",
            [kind.as_str()],
        )?;
    }

    for kind in BudgetKind::ALL {
        connection.execute(
            "INSERT OR IGNORE INTO budget_kind (name) VALUES (?1)",
            [kind.as_str()],
        )?;
    }

    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            budget_kind TEXT NOT NULL,
            FOREIGN KEY(kind) REFERENCES account_kind(name),
            FOREIGN KEY(budget_kind) REFERENCES budget_kind(name)
        )",
        (),
    )?;

    Ok(())
}

/// Add an account and the ledger entry for its opening balance.
///
/// Both rows are written in one SQL transaction, so a failure leaves neither.
/// The opening entry has the payee [OPENING_BALANCE_PAYEE], no category, is
/// uncleared and is flagged so it never counts as income.
///
/// # Errors
/// Returns [Error::DuplicateAccountName] if an account already has the name,
/// or [Error::SqlError] if there is some other SQL error.
pub fn add_account(
    new_account: NewAccount,
    opening_balance: Option<OpeningBalance>,
    connection: &Connection,
) -> Result<Account, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let account_id: AccountId = sql_transaction
        .query_row(
            "INSERT INTO account (name, kind, budget_kind) VALUES (?1, ?2, ?3) RETURNING id",
            (&new_account.name, new_account.kind, new_account.budget_kind),
            |row| row.get(0),
        )
        .map_err(|error| map_duplicate_name_error(error, &new_account.name))?;

    if let Some(OpeningBalance { amount, date }) = opening_balance {
        let direction = if amount < Decimal::ZERO {
            Direction::Outflow
        } else {
            Direction::Inflow
        };

        let opening_entry = create_transaction(
            Transaction::build(
                amount.abs(),
                direction,
                date,
                OPENING_BALANCE_PAYEE,
                account_id,
            )
            .cleared_status(ClearedStatus::Uncleared),
            &sql_transaction,
        )?;
        mark_opening_balance(opening_entry.id, &sql_transaction)?;
    }

    sql_transaction.commit()?;

    get_account(account_id, connection)?.ok_or(Error::NotFound)
}

/// Get an account with its derived balance.
///
/// Returns `Ok(None)` if there is no account with that ID.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Option<Account>, Error> {
    let Some(row) = connection
        .prepare("SELECT id, name, kind, budget_kind FROM account WHERE id = :id")?
        .query_row(&[(":id", &id)], map_account_row)
        .optional()?
    else {
        return Ok(None);
    };

    let balance = balance_for_account(id, connection)?;

    Ok(Some(row.with_balance(balance)))
}

/// Get every account with its derived balance, ordered by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    let mut balances = balances_by_account(connection)?;

    connection
        .prepare("SELECT id, name, kind, budget_kind FROM account ORDER BY name ASC, id ASC")?
        .query_map([], map_account_row)?
        .map(|row| -> Result<Account, Error> {
            let row = row?;
            let balance = balances.remove(&row.id).unwrap_or_default();
            Ok(row.with_balance(balance))
        })
        .collect()
}

/// Rename an account or change its kinds.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if `id` does not refer to an account,
/// or [Error::DuplicateAccountName] if another account has the new name.
pub fn update_account(
    id: AccountId,
    new_account: NewAccount,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE account SET name = ?1, kind = ?2, budget_kind = ?3 WHERE id = ?4",
            (
                &new_account.name,
                new_account.kind,
                new_account.budget_kind,
                id,
            ),
        )
        .map_err(|error| map_duplicate_name_error(error, &new_account.name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Delete an account along with all of its ledger entries.
///
/// # Errors
/// Returns [Error::DeleteMissingAccount] if `id` does not refer to an account.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let entries_deleted = sql_transaction.execute(
        "DELETE FROM financial_transaction WHERE account_id = ?1",
        [id],
    )?;
    let rows_affected = sql_transaction.execute("DELETE FROM account WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    sql_transaction.commit()?;
    tracing::debug!("deleted account {id} and {entries_deleted} ledger entries");

    Ok(())
}

/// The sum of the balances of the accounts with `budget_kind`.
pub fn total_balance(accounts: &[Account], budget_kind: BudgetKind) -> Decimal {
    accounts
        .iter()
        .filter(|account| account.budget_kind == budget_kind)
        .map(|account| account.balance)
        .sum()
}

fn map_account_row(row: &Row) -> Result<AccountRow, rusqlite::Error> {
    Ok(AccountRow {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        budget_kind: row.get(3)?,
    })
}

fn map_duplicate_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("account.name") =>
        {
            Error::DuplicateAccountName(name.to_owned())
        }
        error => error.into(),
    }
}
