//! Defines the endpoint for deleting an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    envelope::{EnvelopeId, delete_envelope},
};

/// The state needed to delete an envelope.
#[derive(Debug, Clone)]
pub struct DeleteEnvelopeState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an envelope, responds with an alert.
pub async fn delete_envelope_endpoint(
    State(state): State<DeleteEnvelopeState>,
    Path(envelope_id): Path<EnvelopeId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_envelope(envelope_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Envelope deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ Error::DeleteMissingEnvelope) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete envelope {envelope_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        db::initialize,
        envelope::{
            create_envelope,
            delete_endpoint::{DeleteEnvelopeState, delete_envelope_endpoint},
            get_envelope,
        },
        month::YearMonth,
    };

    fn get_test_state() -> DeleteEnvelopeState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DeleteEnvelopeState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn deletes_envelope() {
        let state = get_test_state();
        let id = create_envelope(
            YearMonth::new(2025, 1).unwrap(),
            dec!(5),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .id
        .unwrap();

        let response = delete_envelope_endpoint(State(state.clone()), Path(id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_envelope(id, &state.db_connection.lock().unwrap()), Ok(None));
    }

    #[tokio::test]
    async fn missing_envelope_is_not_found() {
        let state = get_test_state();

        let response = delete_envelope_endpoint(State(state), Path(7)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
