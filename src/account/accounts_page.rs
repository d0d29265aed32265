//! Displays accounts and their balances, grouped by whether they are on budget.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    account::{Account, BudgetKind, get_all_accounts, total_balance},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, NEGATIVE_AMOUNT_STYLE, PAGE_CONTAINER_STYLE, PageMode, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, edit_delete_action_links, format_currency, page,
    },
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the accounts page showing all accounts.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get all accounts: {error}"))?;

    Ok(page(
        "Accounts",
        endpoints::ACCOUNTS_VIEW,
        &[],
        &accounts_view(&accounts),
        mode,
    )
    .into_response())
}

fn amount_cell(amount: Decimal) -> Markup {
    let style = if amount < Decimal::ZERO {
        NEGATIVE_AMOUNT_STYLE
    } else {
        ""
    };

    html!( span class=(style) { (format_currency(amount)) } )
}

fn accounts_table(accounts: &[&Account], budget_kind: BudgetKind, total: Decimal) -> Markup {
    let table_id = format!("accounts-{}", budget_kind.as_str());

    html!(
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold my-2" { (budget_kind.label()) }

            table id=(table_id) class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class="px-6 py-3 text-right" { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "As Of" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for account in accounts {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th
                                scope="row"
                                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                            {
                                a
                                    href={ (endpoints::TRANSACTIONS_VIEW) "?account_id=" (account.id) }
                                    class=(LINK_STYLE)
                                {
                                    (account.name)
                                }
                            }

                            td class=(TABLE_CELL_STYLE) { (account.kind.label()) }

                            td class="px-6 py-4 text-right tabular-nums" { (amount_cell(account.balance)) }

                            td class=(TABLE_CELL_STYLE)
                            {
                                time datetime=(account.balance_date) { (account.balance_date) }
                            }

                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-4"
                                {
                                    (edit_delete_action_links(
                                        &format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id),
                                        &format_endpoint(endpoints::ACCOUNT, account.id),
                                        &format!(
                                            "Are you sure you want to delete the account '{}' and all of its transactions? This cannot be undone.",
                                            account.name
                                        ),
                                        "closest tr",
                                        "delete",
                                    ))
                                }
                            }
                        }
                    }

                    @if accounts.is_empty() {
                        tr
                        {
                            td colspan="5" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No accounts."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        th scope="row" colspan="2" class=(TABLE_CELL_STYLE) { "Total" }
                        td class="px-6 py-4 text-right tabular-nums" data-total="true" { (amount_cell(total)) }
                        td colspan="2" {}
                    }
                }
            }
        }
    )
}

fn accounts_view(accounts: &[Account]) -> Markup {
    let create_account_page_url = endpoints::NEW_ACCOUNT_VIEW;

    html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(create_account_page_url) class=(LINK_STYLE) { "Add Account" }
                }

                @if accounts.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "No accounts found. Create an account "
                        a href=(create_account_page_url) class=(LINK_STYLE) { "here" }
                        "."
                    }
                } @else {
                    @for budget_kind in BudgetKind::ALL {
                        @let group: Vec<&Account> = accounts
                            .iter()
                            .filter(|account| account.budget_kind == budget_kind)
                            .collect();

                        (accounts_table(&group, budget_kind, total_balance(accounts, budget_kind)))
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        account::{
            AccountKind, BudgetKind, NewAccount, OpeningBalance, accounts_page::AccountsPageState,
            add_account, get_accounts_page,
        },
        db::initialize,
        endpoints,
        html::PageMode,
        test_utils::{assert_valid_html, parse_html_document, parse_html_fragment},
    };

    fn get_test_state() -> AccountsPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        AccountsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn must_add(state: &AccountsPageState, name: &str, budget_kind: BudgetKind, amount: &str) {
        add_account(
            NewAccount::new_unchecked(name, AccountKind::Checking, budget_kind),
            Some(OpeningBalance {
                amount: amount.parse().unwrap(),
                date: date!(2025 - 01 - 01),
            }),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    fn total_text(html: &Html, budget_kind: BudgetKind) -> String {
        let selector =
            Selector::parse(&format!("#accounts-{} [data-total]", budget_kind.as_str())).unwrap();

        html.select(&selector)
            .next()
            .expect("total cell missing")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn groups_accounts_with_totals() {
        let state = get_test_state();
        must_add(&state, "Everyday", BudgetKind::Budget, "1200.50");
        must_add(&state, "Visa", BudgetKind::Budget, "-200.25");
        must_add(&state, "KiwiSaver", BudgetKind::OffBudget, "5000");

        let response = get_accounts_page(State(state), PageMode::Full)
            .await
            .expect("could not render page");

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(total_text(&html, BudgetKind::Budget), "$1,000.25");
        assert_eq!(total_text(&html, BudgetKind::OffBudget), "$5,000.00");
        let on_budget_rows = html
            .select(&Selector::parse("#accounts-Budget tbody tr").unwrap())
            .count();
        assert_eq!(on_budget_rows, 2);
    }

    #[tokio::test]
    async fn empty_page_links_to_create_account() {
        let state = get_test_state();

        let response = get_accounts_page(State(state), PageMode::Full)
            .await
            .expect("could not render page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let link = html
            .select(&Selector::parse("main p a").unwrap())
            .next()
            .expect("no link to create an account");
        assert_eq!(link.value().attr("href"), Some(endpoints::NEW_ACCOUNT_VIEW));
    }

    #[tokio::test]
    async fn htmx_request_gets_fragment() {
        let state = get_test_state();

        let response = get_accounts_page(State(state), PageMode::Fragment)
            .await
            .expect("could not render page");

        let html = parse_html_fragment(response).await;
        assert!(html.select(&Selector::parse("nav").unwrap()).next().is_none());
        assert!(html.select(&Selector::parse("main").unwrap()).next().is_some());
    }
}
