//! Defines the endpoint for creating an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{CategoryTree, get_all_categories},
    endpoints,
    envelope::{
        create_envelope,
        form::{CreateEnvelopeForm, EnvelopeFormValues, envelope_form_view},
    },
    month::YearMonth,
};

/// The state needed to create an envelope.
#[derive(Debug, Clone)]
pub struct CreateEnvelopeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating an envelope, redirects to the envelopes view on success.
///
/// A malformed month or a negative amount re-renders the form with an error message.
pub async fn create_envelope_endpoint(
    State(state): State<CreateEnvelopeState>,
    Form(form): Form<CreateEnvelopeForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = form
        .month
        .parse::<YearMonth>()
        .and_then(|month| create_envelope(month, form.budgeted, form.category_id, &connection));

    match result {
        Ok(_) => (
            HxRedirect(endpoints::ENVELOPES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidMonth(_) | Error::NegativeAmount)) => {
            let tree = match get_all_categories(&connection) {
                Ok(categories) => CategoryTree::new(categories),
                Err(error) => return error.into_alert_response(),
            };
            let values = EnvelopeFormValues {
                month: &form.month,
                budgeted: form.budgeted,
                category_id: form.category_id,
            };

            envelope_form_view(&tree, &values, &format!("Error: {error}")).into_response()
        }
        Err(error @ (Error::DuplicateEnvelope | Error::InvalidForeignKey)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not create envelope with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
