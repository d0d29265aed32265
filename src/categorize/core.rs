//! Assigns categories to uncategorized ledger entries by matching payees.

use std::time::Instant;

use rusqlite::Connection;

use crate::{
    Error,
    category::CategoryId,
    transaction::{Transaction, TransactionId, get_all_transactions, set_transaction_category},
};

/// The outcome of an auto-categorization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizationResult {
    /// The number of ledger entries that had no category.
    pub entries_checked: usize,
    /// How many of those were given a category.
    pub entries_categorized: usize,
}

/// Pick a category for each uncategorized entry in `entries`.
///
/// An uncategorized entry takes the category of the first categorized entry,
/// in the order of `entries`, with exactly the same payee. Entries with no
/// match are left out of the result.
pub fn match_categories(entries: &[Transaction]) -> Vec<(TransactionId, CategoryId)> {
    let (categorized, uncategorized): (Vec<&Transaction>, Vec<&Transaction>) = entries
        .iter()
        .partition(|entry| entry.category_id.is_some());

    uncategorized
        .into_iter()
        .filter_map(|entry| {
            categorized
                .iter()
                .find(|candidate| candidate.payee == entry.payee)
                .and_then(|candidate| candidate.category_id)
                .map(|category_id| (entry.id, category_id))
        })
        .collect()
}

/// Categorize every uncategorized ledger entry whose payee matches a categorized one.
///
/// The updates are made in a single SQL transaction.
pub fn auto_categorize(connection: &Connection) -> Result<CategorizationResult, Error> {
    let start_time = Instant::now();

    let entries = get_all_transactions(connection)?;
    let entries_checked = entries
        .iter()
        .filter(|entry| entry.category_id.is_none())
        .count();
    let matches = match_categories(&entries);

    let transaction = connection.unchecked_transaction()?;

    for (entry_id, category_id) in &matches {
        set_transaction_category(*entry_id, Some(*category_id), &transaction)?;
    }

    transaction.commit()?;

    let result = CategorizationResult {
        entries_checked,
        entries_categorized: matches.len(),
    };

    tracing::info!(
        "Categorized {} of {} uncategorized transactions in {:.1}ms",
        result.entries_categorized,
        result.entries_checked,
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    Ok(result)
}
