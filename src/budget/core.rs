//! Joins the category tree, envelopes and outflows into the rows of a month's budget.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    account::BudgetKind,
    category::{Category, CategoryId, CategoryTree},
    envelope::Envelope,
    money::get_decimal,
    month::YearMonth,
    transaction::Direction,
};

/// One category's line in a month's budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRow {
    pub category: Category,
    pub is_root: bool,
    /// The category's envelope, a zero placeholder if none has been saved.
    pub envelope: Envelope,
    pub outflow: Decimal,
    /// Budgeted minus outflow.
    pub balance: Decimal,
}

/// Totals for a month's budget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthSummary {
    /// Money received into on budget accounts, not counting opening balances.
    pub income: Decimal,
    pub budgeted: Decimal,
    pub outflow: Decimal,
    pub balance: Decimal,
    /// The total of the negative envelope balances, as a positive number.
    pub overspent: Decimal,
    /// Income that has not been given to an envelope yet.
    pub available: Decimal,
}

/// Build the budget rows for `month`, each root followed by its children.
///
/// `envelopes` may be in any order. Categories without an envelope get a zero placeholder.
pub fn build_budget(
    month: YearMonth,
    tree: &CategoryTree,
    envelopes: Vec<Envelope>,
    outflows: &HashMap<Option<CategoryId>, Decimal>,
) -> Vec<BudgetRow> {
    let mut envelopes_by_category: HashMap<CategoryId, Envelope> = envelopes
        .into_iter()
        .filter(|envelope| envelope.month == month)
        .filter_map(|envelope| envelope.category_id.map(|id| (id, envelope)))
        .collect();

    tree.rows()
        .map(|row| {
            let category = row.category;
            let envelope = envelopes_by_category
                .remove(&category.id)
                .unwrap_or_else(|| Envelope::placeholder(month, Some(category.id)));
            let outflow = outflows
                .get(&Some(category.id))
                .copied()
                .unwrap_or_default();

            BudgetRow {
                category: category.clone(),
                is_root: row.is_root,
                balance: envelope.budgeted - outflow,
                envelope,
                outflow,
            }
        })
        .collect()
}

impl MonthSummary {
    /// Total the budget rows and compare them against `income`.
    pub fn new(rows: &[BudgetRow], income: Decimal) -> Self {
        let mut summary = rows.iter().fold(
            MonthSummary {
                income,
                ..Default::default()
            },
            |mut summary, row| {
                summary.budgeted += row.envelope.budgeted;
                summary.outflow += row.outflow;
                summary.balance += row.balance;

                if row.balance < Decimal::ZERO {
                    summary.overspent -= row.balance;
                }

                summary
            },
        );

        summary.available = summary.income - summary.budgeted;

        summary
    }
}

/// The money that came into on budget accounts during `month`.
///
/// Opening balances are not income.
pub fn get_income(month: YearMonth, connection: &Connection) -> Result<Decimal, Error> {
    let mut statement = connection.prepare(
        "SELECT t.amount FROM financial_transaction t
         INNER JOIN account a ON a.id = t.account_id
         WHERE t.direction = ?1
            AND a.budget_kind = ?2
            AND t.is_opening_balance = 0
            AND substr(t.posted_on, 1, 7) = ?3",
    )?;

    let amounts = statement.query_map(
        (
            Direction::Inflow,
            BudgetKind::Budget.as_str(),
            month,
        ),
        |row| get_decimal(row, 0),
    )?;

    let mut income = Decimal::ZERO;

    for amount in amounts {
        income += amount?;
    }

    Ok(income)
}
