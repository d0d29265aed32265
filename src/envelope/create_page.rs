//! Defines the route handler for the page for creating an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    category::{CategoryTree, get_all_categories},
    endpoints,
    envelope::form::{EnvelopeFormValues, envelope_form_view},
    html::{FORM_CONTAINER_STYLE, PageMode, dollar_input_styles, page},
    month::YearMonth,
    timezone::local_today,
};

/// The state needed for the create envelope page.
#[derive(Debug, Clone)]
pub struct CreateEnvelopePageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateEnvelopePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating an envelope, defaulting to the current month.
pub async fn get_create_envelope_page(
    State(state): State<CreateEnvelopePageState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let month = YearMonth::from_date(local_today(&state.local_timezone)?).to_string();

    let tree = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        CategoryTree::new(get_all_categories(&connection)?)
    };

    let values = EnvelopeFormValues {
        month: &month,
        budgeted: Decimal::ZERO,
        category_id: None,
    };

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Envelope" }
            (envelope_form_view(&tree, &values, ""))
        }
    };

    Ok(page(
        "Create Envelope",
        endpoints::NEW_ENVELOPE_VIEW,
        &[dollar_input_styles()],
        &content,
        mode,
    )
    .into_response())
}
