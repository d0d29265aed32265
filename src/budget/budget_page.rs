//! The budget for one month with inline editors for each envelope.

use std::sync::{Arc, Mutex};

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
    budget::{BudgetRow, MonthSummary, build_budget, get_income},
    category::{CategoryTree, get_all_categories},
    endpoints,
    envelope::{
        ENVELOPE_UPDATED_EVENT, envelope_amount_view, get_envelopes_for_month,
        get_outflow_by_category,
    },
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, NEGATIVE_AMOUNT_STYLE,
        PAGE_CONTAINER_STYLE, PageMode, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, link, page,
    },
    month::YearMonth,
    timezone::local_today,
};

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month to show, `YYYY-MM`. Defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<String>,
}

/// Renders the budget for a month.
pub async fn get_budget_page(
    State(state): State<BudgetPageState>,
    Query(query): Query<BudgetQuery>,
    mode: PageMode,
) -> Result<Response, Error> {
    let month = match query.month.as_deref() {
        Some(month) if !month.is_empty() => month.parse::<YearMonth>()?,
        _ => YearMonth::from_date(local_today(&state.local_timezone)?),
    };

    let (rows, summary) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let tree = CategoryTree::new(get_all_categories(&connection)?);
        let envelopes = get_envelopes_for_month(month, &connection)?;
        let outflows = get_outflow_by_category(month, &connection)?;
        let income = get_income(month, &connection)?;

        let rows = build_budget(month, &tree, envelopes, &outflows);
        let summary = MonthSummary::new(&rows, income);

        (rows, summary)
    };

    Ok(page(
        &format!("Budget {}", month.label()),
        endpoints::BUDGET_VIEW,
        &[],
        &budget_view(month, &rows, &summary),
        mode,
    )
    .into_response())
}

fn month_url(month: YearMonth) -> String {
    format!("{}?month={month}", endpoints::BUDGET_VIEW)
}

fn amount_style(amount: Decimal) -> &'static str {
    if amount < Decimal::ZERO {
        NEGATIVE_AMOUNT_STYLE
    } else {
        ""
    }
}

fn budget_row_view(row: &BudgetRow) -> Markup {
    let name_style = if row.is_root {
        "px-6 py-3 font-semibold text-gray-900 dark:text-white"
    } else {
        "py-3 pl-12 pr-6"
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-category-id=(row.category.id)
        {
            td class=(name_style) { (row.category.name) }
            td class="px-6 py-3 text-right" { (envelope_amount_view(&row.envelope)) }
            td class="px-6 py-3 text-right" { (format_currency(row.outflow)) }
            td class={ "px-6 py-3 text-right " (amount_style(row.balance)) } data-balance="true"
            {
                (format_currency(row.balance))
            }
        }
    }
}

fn summary_view(summary: &MonthSummary) -> Markup {
    let items = [
        ("Income", summary.income),
        ("Budgeted", summary.budgeted),
        ("Spent", summary.outflow),
        ("Remaining", summary.balance),
        ("Overspent", summary.overspent),
        ("Available to Budget", summary.available),
    ];

    html! {
        dl id="budget-summary" class="grid grid-cols-2 md:grid-cols-3 gap-4"
        {
            @for (label, amount) in items {
                div class="rounded bg-white dark:bg-gray-800 p-4 shadow"
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    dd class={ "text-lg font-semibold " (amount_style(amount)) } { (format_currency(amount)) }
                }
            }
        }
    }
}

fn month_actions_view(month: YearMonth) -> Markup {
    let previous = month.previous();

    html! {
        div class="flex flex-col md:flex-row gap-4"
        {
            form
                hx-post=(endpoints::SEED_BUDGET)
                hx-target-error="#alert-container"
                class="flex items-center gap-2"
            {
                input type="hidden" name="month" value=(month);

                input
                    type="number"
                    name="amount"
                    aria-label="Amount for every category"
                    step="0.01"
                    min="0"
                    value="0"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Budget Every Category" }
            }

            form
                hx-post=(endpoints::COPY_BUDGET)
                hx-target-error="#alert-container"
                hx-confirm={ "Replace this month's amounts with " (previous.label()) "'s?" }
                class="flex items-center gap-2"
            {
                input type="hidden" name="source_month" value=(previous);
                input type="hidden" name="target_month" value=(month);

                button type="submit" class=(BUTTON_SECONDARY_STYLE)
                {
                    "Copy From " (previous.label())
                }
            }
        }
    }
}

fn budget_view(month: YearMonth, rows: &[BudgetRow], summary: &MonthSummary) -> Markup {
    html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div
                id="budget"
                hx-get=(month_url(month))
                hx-trigger={ (ENVELOPE_UPDATED_EVENT) " from:body" }
                hx-select="#budget"
                hx-swap="outerHTML"
                class="w-full lg:max-w-5xl space-y-6"
            {
                div class="flex justify-between items-center"
                {
                    a href=(month_url(month.previous())) class=(LINK_STYLE) rel="prev"
                    {
                        "← " (month.previous().label())
                    }

                    h1 class="text-xl font-bold" { (month.label()) }

                    a href=(month_url(month.next())) class=(LINK_STYLE) rel="next"
                    {
                        (month.next().label()) " →"
                    }
                }

                (summary_view(summary))

                @if rows.is_empty() {
                    p
                    {
                        "There are no categories to budget for. "
                        (link(endpoints::CATEGORIES_VIEW, "Add a category"))
                        " to get started."
                    }
                } @else {
                    (month_actions_view(month))

                    section class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class="px-6 py-4 text-right" { "Budgeted" }
                                    th scope="col" class="px-6 py-4 text-right" { "Outflow" }
                                    th scope="col" class="px-6 py-4 text-right" { "Balance" }
                                }
                            }

                            tbody
                            {
                                @for row in rows {
                                    (budget_row_view(row))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        budget::budget_page::{BudgetPageState, BudgetQuery, get_budget_page},
        category::{CategoryName, create_category},
        db::initialize,
        envelope::{EnvelopeKey, update_envelope_amount},
        html::PageMode,
        month::YearMonth,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Direction, Transaction, create_transaction, test_utils::must_create_account},
    };

    fn get_test_state(connection: Connection) -> BudgetPageState {
        BudgetPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn renders_one_row_per_category() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let bills =
            create_category(CategoryName::new_unchecked("Bills"), None, &connection).unwrap();
        let power = create_category(
            CategoryName::new_unchecked("Power"),
            Some(bills.id),
            &connection,
        )
        .unwrap();
        let account_id = must_create_account("Everyday", &connection);
        let month = YearMonth::new(2025, 3).unwrap();
        update_envelope_amount(
            EnvelopeKey::Natural {
                month,
                category_id: Some(power.id),
            },
            dec!(80),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                dec!(95),
                Direction::Outflow,
                date!(2025 - 03 - 10),
                "Power Co",
                account_id,
            )
            .category_id(Some(power.id)),
            &connection,
        )
        .unwrap();

        let response = get_budget_page(
            State(get_test_state(connection)),
            Query(BudgetQuery {
                month: Some("2025-03".to_owned()),
            }),
            PageMode::Full,
        )
        .await
        .expect("could not render page");

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let heading = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(heading, "March 2025");
        let balances: Vec<String> = html
            .select(&Selector::parse("tbody td[data-balance]").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();
        assert_eq!(balances, ["$0.00", "-$15.00"]);
        let previous = html
            .select(&Selector::parse("a[rel=prev]").unwrap())
            .next()
            .expect("no previous month link");
        assert_eq!(previous.value().attr("href"), Some("/budget?month=2025-02"));
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = get_budget_page(
            State(get_test_state(connection)),
            Query(BudgetQuery {
                month: Some("March".to_owned()),
            }),
            PageMode::Full,
        )
        .await;

        assert_eq!(result.as_ref().err(), Some(&Error::InvalidMonth("March".to_owned())));
        assert_eq!(
            result.unwrap_err().into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn empty_budget_links_to_categories() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let response = get_budget_page(
            State(get_test_state(connection)),
            Query(BudgetQuery::default()),
            PageMode::Fragment,
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let link = html
            .select(&Selector::parse("p a").unwrap())
            .next()
            .expect("no link to categories");
        assert_eq!(link.value().attr("href"), Some("/categories"));
    }
}
