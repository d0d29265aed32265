//! Ledger entries: the money moving in and out of accounts.
//!
//! Entries are stored with a non-negative amount and a direction, and may be
//! filed under a category. This module holds the model, its queries, and the
//! ledger pages and endpoints.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod transactions_page;

pub use core::{
    ClearedStatus, Direction, Transaction, TransactionBuilder, TransactionId, create_transaction,
    create_transaction_tables, delete_transaction, get_all_transactions, get_transaction,
    get_transactions_for_account, mark_opening_balance, set_transaction_category,
    update_transaction,
};
#[cfg(test)]
pub(crate) use core::test_utils;
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use transactions_page::get_transactions_page;
