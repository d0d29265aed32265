//! Spending per envelope, the data behind the reports.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error, category::CategoryId, envelope::get_all_envelopes_with_outflow, month::YearMonth,
};

/// The money spent from one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingRow {
    pub month: YearMonth,
    pub category_id: Option<CategoryId>,
    pub category_label: String,
    pub amount: Decimal,
}

/// The outflows of every envelope, or only the envelopes of `month` if given.
///
/// Envelopes with no spending are included with a zero amount. Rows are
/// ordered by month then category name.
pub fn get_spending_by_category(
    month: Option<YearMonth>,
    connection: &Connection,
) -> Result<Vec<SpendingRow>, Error> {
    let rows = get_all_envelopes_with_outflow(connection)?
        .into_iter()
        .filter(|row| month.is_none_or(|month| row.envelope.month == month))
        .map(|row| SpendingRow {
            month: row.envelope.month,
            category_id: row.envelope.category_id,
            category_label: row.category_label,
            amount: row.outflow,
        })
        .collect();

    Ok(rows)
}
