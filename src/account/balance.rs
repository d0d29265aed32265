//! Derives account balances from ledger entries.
//!
//! Balances are never stored. They are recomputed from the entries every
//! time an account is read.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, macros::date};

use crate::{Error, account::AccountId, money::get_decimal, transaction::Direction};

/// The balance date reported for an account that has no ledger entries.
pub const NO_ENTRIES_BALANCE_DATE: Date = date!(2025 - 01 - 01);

/// The parts of a ledger entry that affect a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceEntry {
    pub amount: Decimal,
    pub direction: Direction,
    pub posted_on: Date,
}

/// An account's balance and the date of its latest entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountBalance {
    pub balance: Decimal,
    pub date: Date,
}

impl Default for AccountBalance {
    fn default() -> Self {
        Self {
            balance: Decimal::ZERO,
            date: NO_ENTRIES_BALANCE_DATE,
        }
    }
}

/// Sum inflows minus outflows and find the latest posting date.
///
/// With no entries the balance is zero and the date is [NO_ENTRIES_BALANCE_DATE].
pub fn derive_balance<I>(entries: I) -> AccountBalance
where
    I: IntoIterator<Item = BalanceEntry>,
{
    entries
        .into_iter()
        .fold(None, |acc: Option<AccountBalance>, entry| {
            let signed = entry.direction.signed(entry.amount);

            Some(match acc {
                None => AccountBalance {
                    balance: signed,
                    date: entry.posted_on,
                },
                Some(acc) => AccountBalance {
                    balance: acc.balance + signed,
                    date: acc.date.max(entry.posted_on),
                },
            })
        })
        .unwrap_or_default()
}

fn map_balance_entry(row: &rusqlite::Row, offset: usize) -> Result<BalanceEntry, rusqlite::Error> {
    Ok(BalanceEntry {
        amount: get_decimal(row, offset)?,
        direction: row.get(offset + 1)?,
        posted_on: row.get(offset + 2)?,
    })
}

/// Derive the balance of one account from its own ledger entries.
pub fn balance_for_account(
    account_id: AccountId,
    connection: &Connection,
) -> Result<AccountBalance, Error> {
    let mut statement = connection.prepare(
        "SELECT amount, direction, posted_on FROM financial_transaction WHERE account_id = ?1",
    )?;
    let entries = statement
        .query_map([account_id], |row| map_balance_entry(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(derive_balance(entries))
}

/// Derive the balance of every account that has at least one ledger entry.
pub fn balances_by_account(
    connection: &Connection,
) -> Result<HashMap<AccountId, AccountBalance>, Error> {
    let mut statement = connection
        .prepare("SELECT account_id, amount, direction, posted_on FROM financial_transaction")?;
    let rows = statement.query_map([], |row| {
        Ok((row.get::<_, AccountId>(0)?, map_balance_entry(row, 1)?))
    })?;

    let mut entries_by_account: HashMap<AccountId, Vec<BalanceEntry>> = HashMap::new();
    for row in rows {
        let (account_id, entry) = row?;
        entries_by_account.entry(account_id).or_default().push(entry);
    }

    Ok(entries_by_account
        .into_iter()
        .map(|(account_id, entries)| (account_id, derive_balance(entries)))
        .collect())
}


#[cfg(test)]
mod balances_by_account_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{Direction, Transaction, create_transaction, test_utils::must_create_account},
    };

    use super::{NO_ENTRIES_BALANCE_DATE, balance_for_account, balances_by_account};

    #[test]
    fn groups_entries_by_account() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let everyday = must_create_account("Everyday", &conn);
        let savings = must_create_account("Savings", &conn);
        let _empty = must_create_account("Empty", &conn);
        for (amount, direction, account_id) in [
            (dec!(20), Direction::Inflow, everyday),
            (dec!(5.5), Direction::Outflow, everyday),
            (dec!(300), Direction::Inflow, savings),
        ] {
            create_transaction(
                Transaction::build(amount, direction, date!(2025 - 04 - 01), "", account_id),
                &conn,
            )
            .unwrap();
        }

        let balances = balances_by_account(&conn).unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&everyday].balance, dec!(14.5));
        assert_eq!(balances[&savings].balance, dec!(300));
    }

    #[test]
    fn single_account_ignores_other_accounts() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let everyday = must_create_account("Everyday", &conn);
        let savings = must_create_account("Savings", &conn);
        let empty = must_create_account("Empty", &conn);
        for (amount, direction, posted_on, account_id) in [
            (dec!(20), Direction::Inflow, date!(2025 - 04 - 01), everyday),
            (dec!(5.5), Direction::Outflow, date!(2025 - 04 - 03), everyday),
            (dec!(300), Direction::Inflow, date!(2025 - 05 - 01), savings),
        ] {
            create_transaction(
                Transaction::build(amount, direction, posted_on, "", account_id),
                &conn,
            )
            .unwrap();
        }

        let balance = balance_for_account(everyday, &conn).unwrap();
        let empty_balance = balance_for_account(empty, &conn).unwrap();

        assert_eq!(balance.balance, dec!(14.5));
        assert_eq!(balance.date, date!(2025 - 04 - 03));
        assert_eq!(empty_balance.balance, dec!(0));
        assert_eq!(empty_balance.date, NO_ENTRIES_BALANCE_DATE);
    }
}
