//! The page listing every saved envelope with its outflow and balance.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    envelope::{
        ENVELOPE_UPDATED_EVENT, EnvelopeActivity, envelope_amount_view,
        get_all_envelopes_with_outflow,
    },
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, NEGATIVE_AMOUNT_STYLE, PAGE_CONTAINER_STYLE, PageMode,
        TABLE_CELL_STYLE, TABLE_GROUP_ROW_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, link, page,
    },
};

/// The state needed for the envelopes page.
#[derive(Debug, Clone)]
pub struct EnvelopesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EnvelopesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the envelopes page.
pub async fn get_envelopes_page(
    State(state): State<EnvelopesPageState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_envelopes_with_outflow(&connection)
            .inspect_err(|error| tracing::error!("could not get envelopes: {error}"))?
    };

    Ok(page(
        "Envelopes",
        endpoints::ENVELOPES_VIEW,
        &[],
        &envelopes_view(&rows),
        mode,
    )
    .into_response())
}

fn envelope_row_view(row: &EnvelopeActivity) -> Markup {
    let balance_style = if row.balance.is_sign_negative() {
        NEGATIVE_AMOUNT_STYLE
    } else {
        ""
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.category_label) }
            td class="px-6 py-4 text-right" data-budgeted="true"
            {
                (envelope_amount_view(&row.envelope))
            }
            td class="px-6 py-4 text-right" { (format_currency(row.outflow)) }
            td class={ "px-6 py-4 text-right " (balance_style) } data-balance="true"
            {
                (format_currency(row.balance))
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(id) = row.envelope.id {
                    button
                        type="button"
                        hx-delete=(format_endpoint(endpoints::ENVELOPE, id))
                        hx-confirm={
                            "Delete the " (row.envelope.month.label()) " envelope for "
                            (row.category_label) "?"
                        }
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn envelopes_view(rows: &[EnvelopeActivity]) -> Markup {
    let months = rows.chunk_by(|a, b| a.envelope.month == b.envelope.month);

    html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div
                id="envelopes"
                hx-get=(endpoints::ENVELOPES_VIEW)
                hx-trigger={ (ENVELOPE_UPDATED_EVENT) " from:body" }
                hx-select="#envelopes"
                hx-swap="outerHTML"
                class="w-full lg:max-w-5xl space-y-4"
            {
                div class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Envelopes" }

                    a href=(endpoints::NEW_ENVELOPE_VIEW) class=(LINK_STYLE) { "New Envelope" }
                }

                @if rows.is_empty() {
                    p
                    {
                        "No envelopes yet. Budget an amount on the "
                        (link(endpoints::BUDGET_VIEW, "budget page"))
                        " or create an envelope directly."
                    }
                } @else {
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            @for month_rows in months {
                                tbody
                                {
                                    tr class=(TABLE_GROUP_ROW_STYLE)
                                    {
                                        th scope="colgroup" colspan="5" class=(TABLE_CELL_STYLE)
                                        {
                                            (month_rows[0].envelope.month.label())
                                        }
                                    }

                                    @for row in month_rows {
                                        (envelope_row_view(row))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
