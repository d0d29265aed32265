//! The inline editor for an envelope's budgeted amount.
//!
//! The budget and envelopes pages show each amount as a button. Clicking it
//! swaps in a small form, and saving swaps the button back with the new
//! amount. Saved envelopes are edited by ID, unsaved ones by month and
//! category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HX_TRIGGER;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::CategoryId,
    endpoints::{self, format_endpoint},
    envelope::{
        Envelope, EnvelopeId, EnvelopeKey, get_envelope, get_envelope_by_key,
        update_envelope_amount,
    },
    html::{FORM_TEXT_INPUT_STYLE, LINK_STYLE, format_currency},
    month::YearMonth,
};

/// The htmx event sent after an envelope amount changes.
pub const ENVELOPE_UPDATED_EVENT: &str = "envelope-updated";

/// The natural key of the envelope to edit.
#[derive(Debug, Deserialize)]
pub struct EnvelopeAmountQuery {
    pub month: YearMonth,
    pub category_id: Option<CategoryId>,
}

/// The form data for setting an envelope's budgeted amount.
#[derive(Debug, Deserialize)]
pub struct EnvelopeAmountForm {
    pub month: YearMonth,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub budgeted: Decimal,
}

/// The state needed for the envelope amount editor.
#[derive(Debug, Clone)]
pub struct EnvelopeAmountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EnvelopeAmountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for setting a saved envelope's budgeted amount.
#[derive(Debug, Deserialize)]
pub struct EnvelopeBudgetedForm {
    pub budgeted: Decimal,
}

fn amount_url(key: EnvelopeKey) -> String {
    match key {
        EnvelopeKey::Id(id) => format_endpoint(endpoints::ENVELOPE_AMOUNT_BY_ID, id),
        EnvelopeKey::Natural {
            month,
            category_id: Some(category_id),
        } => format!("{}?month={month}&category_id={category_id}", endpoints::ENVELOPE_AMOUNT),
        EnvelopeKey::Natural {
            month,
            category_id: None,
        } => format!("{}?month={month}", endpoints::ENVELOPE_AMOUNT),
    }
}

/// The budgeted amount as a button that opens the editor.
pub fn envelope_amount_view(envelope: &Envelope) -> Markup {
    html! {
        button
            type="button"
            hx-get=(amount_url(envelope.key()))
            hx-target="this"
            hx-swap="outerHTML"
            title="Change budgeted amount"
            class=(LINK_STYLE)
        {
            (format_currency(envelope.budgeted))
        }
    }
}

fn envelope_amount_form_view(envelope: &Envelope) -> Markup {
    let key = envelope.key();
    let patch_url = match key {
        EnvelopeKey::Id(id) => format_endpoint(endpoints::ENVELOPE_AMOUNT_BY_ID, id),
        EnvelopeKey::Natural { .. } => endpoints::ENVELOPE_AMOUNT.to_owned(),
    };

    html! {
        form
            hx-patch=(patch_url)
            hx-target="this"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="flex items-center gap-2"
        {
            @if let EnvelopeKey::Natural { month, category_id } = key {
                input type="hidden" name="month" value=(month);

                @if let Some(category_id) = category_id {
                    input type="hidden" name="category_id" value=(category_id);
                }
            }

            input
                type="number"
                name="budgeted"
                aria-label="Budgeted amount"
                step="0.01"
                min="0"
                value=(envelope.budgeted)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);

            button type="submit" class=(LINK_STYLE) { "Save" }
        }
    }
}

/// Returns the editor for the envelope's budgeted amount.
pub async fn get_envelope_amount_editor(
    State(state): State<EnvelopeAmountState>,
    Query(query): Query<EnvelopeAmountQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_envelope_by_key(query.month, query.category_id, &connection) {
        Ok(envelope) => {
            let envelope = envelope
                .unwrap_or_else(|| Envelope::placeholder(query.month, query.category_id));
            envelope_amount_form_view(&envelope).into_response()
        }
        Err(error) => {
            tracing::error!("could not get envelope for {query:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// Returns the editor for a saved envelope's budgeted amount.
pub async fn get_envelope_amount_editor_by_id(
    State(state): State<EnvelopeAmountState>,
    Path(envelope_id): Path<EnvelopeId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_envelope(envelope_id, &connection) {
        Ok(Some(envelope)) => envelope_amount_form_view(&envelope).into_response(),
        Ok(None) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!("could not get envelope {envelope_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn save_envelope_amount(
    state: &EnvelopeAmountState,
    key: EnvelopeKey,
    budgeted: Decimal,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_envelope_amount(key, budgeted, &connection) {
        Ok(envelope) => (
            [(HX_TRIGGER, ENVELOPE_UPDATED_EVENT)],
            envelope_amount_view(&envelope),
        )
            .into_response(),
        Err(
            error @ (Error::NegativeAmount
            | Error::InvalidForeignKey
            | Error::UpdateMissingEnvelope),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not set the amount of envelope {key:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// Saves an envelope's budgeted amount, creating the envelope if needed.
///
/// Responds with the amount button and triggers [ENVELOPE_UPDATED_EVENT].
pub async fn update_envelope_amount_endpoint(
    State(state): State<EnvelopeAmountState>,
    Form(form): Form<EnvelopeAmountForm>,
) -> Response {
    let key = EnvelopeKey::Natural {
        month: form.month,
        category_id: form.category_id,
    };

    save_envelope_amount(&state, key, form.budgeted)
}

/// Saves the budgeted amount of a saved envelope.
pub async fn update_envelope_amount_by_id_endpoint(
    State(state): State<EnvelopeAmountState>,
    Path(envelope_id): Path<EnvelopeId>,
    Form(form): Form<EnvelopeBudgetedForm>,
) -> Response {
    save_envelope_amount(&state, EnvelopeKey::Id(envelope_id), form.budgeted)
}
