//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form parses an empty category as None instead of rejecting it.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    transaction::{
        create_transaction,
        form::{TransactionForm, TransactionFormMode, transaction_form_error_response},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a transaction, redirects to the account's ledger on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(form.to_builder(), &connection) {
        Ok(transaction) => (
            HxRedirect(format!(
                "{}?account_id={}",
                endpoints::TRANSACTIONS_VIEW,
                transaction.account_id
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::NegativeAmount) => transaction_form_error_response(
            &TransactionFormMode::Create,
            &form,
            &error,
            &connection,
        ),
        Err(error @ Error::InvalidForeignKey) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not create transaction with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
