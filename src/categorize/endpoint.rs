//! Defines the endpoint for auto-categorizing transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, categorize::auto_categorize};

/// The state needed to auto-categorize transactions.
#[derive(Debug, Clone)]
pub struct AutoCategorizeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AutoCategorizeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Categorizes transactions by payee and responds with an alert with the counts.
pub async fn auto_categorize_endpoint(State(state): State<AutoCategorizeState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match auto_categorize(&connection) {
        Ok(result) => Alert::Success {
            message: "Auto-categorization complete".to_owned(),
            details: format!(
                "Categorized {} of {} uncategorized transactions. Refresh the page to see the changes.",
                result.entries_categorized, result.entries_checked
            ),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not auto-categorize transactions: {error}");
            error.into_alert_response()
        }
    }
}
