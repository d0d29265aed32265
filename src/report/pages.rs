//! The report pages.

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
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, PageMode, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, link, page,
    },
    month::YearMonth,
    report::{
        SpendingRow,
        chart::{ECHARTS_URL, annual_spending_chart, chart_container_view, chart_script},
        get_spending_by_category,
        pie::{pie_chart_view, pie_slices},
    },
    timezone::local_today,
};

/// The state needed for the report pages.
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month for the monthly report, `YYYY-MM`.
#[derive(Debug, Default, Deserialize)]
pub struct MonthlyReportQuery {
    pub month: Option<String>,
}

/// The year for the annual report.
#[derive(Debug, Default, Deserialize)]
pub struct AnnualReportQuery {
    pub year: Option<i32>,
}

fn load_spending(
    state: &ReportsState,
    month: Option<YearMonth>,
) -> Result<Vec<SpendingRow>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_spending_by_category(month, &connection)
        .inspect_err(|error| tracing::error!("could not get spending by category: {error}"))
}

/// Renders the reports index with a month picker.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let month = YearMonth::from_date(today);

    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-6"
            {
                h1 class="text-xl font-bold" { "Reports" }

                form method="get" action=(endpoints::MONTHLY_SPENDING_VIEW) class="space-y-4"
                {
                    div
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                        input
                            id="month"
                            type="month"
                            name="month"
                            value=(month)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Monthly Spending" }
                }

                p
                {
                    "Or see "
                    (link(
                        &format!("{}?year={}", endpoints::ANNUAL_SPENDING_VIEW, today.year()),
                        "spending for the year",
                    ))
                    "."
                }
            }
        }
    };

    Ok(page("Reports", endpoints::REPORTS_VIEW, &[], &content, mode).into_response())
}

fn spending_table_view(rows: &[SpendingRow], show_month: bool) -> Markup {
    let total: Decimal = rows.iter().map(|row| row.amount).sum();

    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    @if show_month {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                    }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class="px-6 py-4 text-right" { "Spent" }
                }
            }

            tbody
            {
                @for row in rows {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        @if show_month {
                            td class=(TABLE_CELL_STYLE) { (row.month.label()) }
                        }
                        td class=(TABLE_CELL_STYLE) { (row.category_label) }
                        td class="px-6 py-4 text-right" { (format_currency(row.amount)) }
                    }
                }
            }

            tfoot
            {
                tr class="font-semibold text-gray-900 dark:text-white"
                {
                    th scope="row" colspan=(if show_month { 2 } else { 1 }) class=(TABLE_CELL_STYLE)
                    {
                        "Total"
                    }
                    td class="px-6 py-4 text-right" data-total="true" { (format_currency(total)) }
                }
            }
        }
    }
}

/// Renders spending by category for a month as a table and a pie chart.
pub async fn get_monthly_spending_page(
    State(state): State<ReportsState>,
    Query(query): Query<MonthlyReportQuery>,
    mode: PageMode,
) -> Result<Response, Error> {
    let month = match query.month.as_deref() {
        Some(month) if !month.is_empty() => month.parse::<YearMonth>()?,
        _ => YearMonth::from_date(local_today(&state.local_timezone)?),
    };

    let rows = load_spending(&state, Some(month))?;
    let slices = pie_slices(&rows);
    let month_url =
        |month: YearMonth| format!("{}?month={month}", endpoints::MONTHLY_SPENDING_VIEW);

    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-4xl space-y-6"
            {
                div class="flex justify-between items-center"
                {
                    a href=(month_url(month.previous())) class=(LINK_STYLE) rel="prev"
                    {
                        "← " (month.previous().label())
                    }

                    h1 class="text-xl font-bold" { "Spending for " (month.label()) }

                    a href=(month_url(month.next())) class=(LINK_STYLE) rel="next"
                    {
                        (month.next().label()) " →"
                    }
                }

                @if rows.is_empty() {
                    p
                    {
                        "Nothing was budgeted this month. "
                        (link(&format!("{}?month={month}", endpoints::BUDGET_VIEW), "Go to the budget"))
                        " to add envelopes."
                    }
                } @else {
                    @if slices.is_empty() {
                        p { "No money has been spent from this month's envelopes." }
                    } @else {
                        (pie_chart_view(&slices))
                    }

                    section class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        (spending_table_view(&rows, false))
                    }
                }
            }
        }
    };

    Ok(page(
        "Monthly Spending",
        endpoints::REPORTS_VIEW,
        &[],
        &content,
        mode,
    )
    .into_response())
}

/// Renders spending by category for every month of a year as a stacked bar chart and a table.
pub async fn get_annual_spending_page(
    State(state): State<ReportsState>,
    Query(query): Query<AnnualReportQuery>,
    mode: PageMode,
) -> Result<Response, Error> {
    let year = match query.year {
        Some(year) => year,
        None => local_today(&state.local_timezone)?.year(),
    };

    let rows: Vec<SpendingRow> = load_spending(&state, None)?
        .into_iter()
        .filter(|row| row.month.year() == year)
        .collect();

    let chart = annual_spending_chart(&rows);
    let year_url = |year: i32| format!("{}?year={year}", endpoints::ANNUAL_SPENDING_VIEW);

    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-6"
            {
                div class="flex justify-between items-center"
                {
                    a href=(year_url(year - 1)) class=(LINK_STYLE) rel="prev" { "← " (year - 1) }
                    h1 class="text-xl font-bold" { "Spending for " (year) }
                    a href=(year_url(year + 1)) class=(LINK_STYLE) rel="next" { (year + 1) " →" }
                }

                @if rows.is_empty() {
                    p { "There are no envelopes for " (year) "." }
                } @else {
                    (chart_container_view())

                    section class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        (spending_table_view(&rows, true))
                    }
                }
            }
        }
    };

    let head_elements = if rows.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
            chart_script(&chart),
        ]
    };

    Ok(page(
        "Annual Spending",
        endpoints::REPORTS_VIEW,
        &head_elements,
        &content,
        mode,
    )
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        envelope::create_envelope,
        html::PageMode,
        month::YearMonth,
        report::pages::{
            AnnualReportQuery, MonthlyReportQuery, ReportsState, get_annual_spending_page,
            get_monthly_spending_page, get_reports_page,
        },
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Direction, Transaction, create_transaction, test_utils::must_create_account},
    };

    fn get_test_state() -> ReportsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = must_create_account("Everyday", &conn);
        let month = YearMonth::new(2025, 5).unwrap();
        for (name, budgeted, spent) in [("Food", dec!(400), dec!(300)), ("Fun", dec!(200), dec!(100))]
        {
            let category = create_category(CategoryName::new_unchecked(name), None, &conn).unwrap();
            create_envelope(month, budgeted, Some(category.id), &conn).unwrap();
            create_transaction(
                Transaction::build(spent, Direction::Outflow, date!(2025 - 05 - 10), name, account_id)
                    .category_id(Some(category.id)),
                &conn,
            )
            .unwrap();
        }

        ReportsState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn reports_page_has_month_picker() {
        let response = get_reports_page(State(get_test_state()), PageMode::Full)
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let input = html
            .select(&Selector::parse("form input[type=month]").unwrap())
            .next();
        assert!(input.is_some());
    }

    #[tokio::test]
    async fn monthly_page_shows_pie_and_total() {
        let response = get_monthly_spending_page(
            State(get_test_state()),
            Query(MonthlyReportQuery {
                month: Some("2025-05".to_owned()),
            }),
            PageMode::Full,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let percents: Vec<_> = html
            .select(&Selector::parse("li[data-percent]").unwrap())
            .map(|item| item.value().attr("data-percent").unwrap().to_owned())
            .collect();
        assert_eq!(percents, ["75", "25"]);
        let total = html
            .select(&Selector::parse("td[data-total]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(total, "$400.00");
        assert_eq!(
            html.select(&Selector::parse("svg circle").unwrap()).count(),
            2
        );
    }

    #[tokio::test]
    async fn annual_page_includes_chart_script() {
        let response = get_annual_spending_page(
            State(get_test_state()),
            Query(AnnualReportQuery { year: Some(2025) }),
            PageMode::Full,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(
            html.select(&Selector::parse("#annual-spending-chart").unwrap())
                .next()
                .is_some()
        );
        let scripts = html
            .select(&Selector::parse("script").unwrap())
            .filter_map(|script| script.value().attr("src"))
            .filter(|src| src.contains("echarts"))
            .count();
        assert_eq!(scripts, 1);
    }

    #[tokio::test]
    async fn annual_page_for_empty_year_has_no_chart() {
        let response = get_annual_spending_page(
            State(get_test_state()),
            Query(AnnualReportQuery { year: Some(1999) }),
            PageMode::Full,
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(
            html.select(&Selector::parse("#annual-spending-chart").unwrap())
                .next()
                .is_none()
        );
    }
}
