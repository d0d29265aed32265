//! The ledger page listing transactions with a running balance.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    category::{CategoryTree, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, NEGATIVE_AMOUNT_STYLE,
        PAGE_CONTAINER_STYLE, PageMode, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        edit_delete_action_links, format_currency, page,
    },
    transaction::{
        ClearedStatus, Transaction, get_all_transactions, get_transactions_for_account,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Restricts the ledger to one account.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub account_id: Option<AccountId>,
}

/// A transaction with the balance after it was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub transaction: Transaction,
    pub balance: Decimal,
}

/// Accumulates balances oldest first and returns the rows newest first.
///
/// `transactions` must be sorted oldest first.
pub fn ledger_rows(transactions: Vec<Transaction>) -> Vec<LedgerRow> {
    let mut balance = Decimal::ZERO;

    let mut rows: Vec<LedgerRow> = transactions
        .into_iter()
        .map(|transaction| {
            balance += transaction.signed_amount();
            LedgerRow {
                transaction,
                balance,
            }
        })
        .collect();

    rows.reverse();
    rows
}

/// Renders the ledger, optionally filtered to one account.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<TransactionsQuery>,
    mode: PageMode,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = match query.account_id {
        Some(account_id) => get_transactions_for_account(account_id, &connection),
        None => get_all_transactions(&connection),
    }
    .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    let categories = CategoryTree::new(get_all_categories(&connection)?);
    drop(connection);

    if let Some(account_id) = query.account_id
        && !accounts.iter().any(|account| account.id == account_id)
    {
        return Err(Error::NotFound);
    }

    let content = transactions_view(
        &ledger_rows(transactions),
        &accounts,
        &categories,
        query.account_id,
    );

    Ok(page(
        "Transactions",
        endpoints::TRANSACTIONS_VIEW,
        &[],
        &content,
        mode,
    )
    .into_response())
}

fn signed_amount_view(amount: Decimal) -> Markup {
    let style = if amount < Decimal::ZERO {
        NEGATIVE_AMOUNT_STYLE
    } else {
        ""
    };

    html!( span class=(style) { (format_currency(amount)) } )
}

fn account_filter_view(accounts: &[Account], selected: Option<AccountId>) -> Markup {
    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW) class="flex gap-2 items-center"
        {
            label for="account-filter" class="sr-only" { "Account" }

            select
                id="account-filter"
                name="account_id"
                onchange="this.form.submit()"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "All accounts" }

                @for account in accounts {
                    option value=(account.id) selected[selected == Some(account.id)]
                    {
                        (account.name)
                    }
                }
            }

            noscript { button type="submit" class=(LINK_STYLE) { "Filter" } }
        }
    }
}

fn transactions_view(
    rows: &[LedgerRow],
    accounts: &[Account],
    categories: &CategoryTree,
    selected_account: Option<AccountId>,
) -> Markup {
    let account_names: HashMap<AccountId, &str> = accounts
        .iter()
        .map(|account| (account.id, account.name.as_str()))
        .collect();
    let new_transaction_url = match selected_account {
        Some(account_id) => format!("{}?account_id={account_id}", endpoints::NEW_TRANSACTION_VIEW),
        None => endpoints::NEW_TRANSACTION_VIEW.to_owned(),
    };

    html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    (account_filter_view(accounts, selected_account))

                    div class="flex gap-4 items-center"
                    {
                        a href=(new_transaction_url) class=(LINK_STYLE) { "Add Transaction" }
                        a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE) { "Import" }

                        button
                            type="button"
                            hx-post=(endpoints::AUTO_CATEGORIZE)
                            hx-target="#alert-container"
                            hx-target-error="#alert-container"
                            hx-swap="innerHTML"
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Auto-categorize"
                        }
                    }
                }

                @if accounts.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "Transactions belong to an account. "
                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "Add an account" }
                        " first."
                    }
                } @else {
                    div class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Payee" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Memo" }
                                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                    th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Cleared" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for row in rows {
                                    @let transaction = &row.transaction;

                                    tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                                    {
                                        td class="px-6 py-4 whitespace-nowrap"
                                        {
                                            time datetime=(transaction.posted_on) { (transaction.posted_on) }
                                        }
                                        td class=(TABLE_CELL_STYLE) { (transaction.payee) }
                                        td class=(TABLE_CELL_STYLE) { (categories.label(transaction.category_id)) }
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            (account_names.get(&transaction.account_id).copied().unwrap_or_default())
                                        }
                                        td class=(TABLE_CELL_STYLE) { (transaction.memo) }
                                        td class="px-6 py-4 text-right tabular-nums"
                                        {
                                            (signed_amount_view(transaction.signed_amount()))
                                        }
                                        td class="px-6 py-4 text-right tabular-nums" data-balance="true"
                                        {
                                            (signed_amount_view(row.balance))
                                        }
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            @if transaction.cleared_status == ClearedStatus::Cleared {
                                                span title="Cleared" { "✓" }
                                            }
                                        }
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            div class="flex gap-4"
                                            {
                                                (edit_delete_action_links(
                                                    &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
                                                    &format_endpoint(endpoints::TRANSACTION, transaction.id),
                                                    &format!(
                                                        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
                                                        transaction.payee
                                                    ),
                                                    "closest tr",
                                                    "delete",
                                                ))
                                            }
                                        }
                                    }
                                }

                                @if rows.is_empty() {
                                    tr
                                    {
                                        td colspan="9" class="px-6 py-4 text-center"
                                        {
                                            "No transactions yet. "
                                            a href=(new_transaction_url) class=(LINK_STYLE) { "Add one" }
                                            " or "
                                            a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE) { "import a statement" }
                                            "."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}
