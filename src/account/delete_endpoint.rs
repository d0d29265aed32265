//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountId, delete_account},
    alert::Alert,
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing account.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account and its ledger entries, responds with an alert.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_account(account_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Account deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ Error::DeleteMissingAccount) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete account {account_id}: {error}");
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

    use crate::{
        account::{
            AccountKind, BudgetKind, NewAccount, add_account, delete_account_endpoint,
            delete_endpoint::DeleteAccountState, get_account,
        },
        db::initialize,
    };

    fn get_test_state() -> DeleteAccountState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DeleteAccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn deletes_account() {
        let state = get_test_state();
        let account = add_account(
            NewAccount::new_unchecked("Old Card", AccountKind::CreditCard, BudgetKind::Budget),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_account_endpoint(State(state.clone()), Path(account.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_account(account.id, &state.db_connection.lock().unwrap()),
            Ok(None)
        );
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let state = get_test_state();

        let response = delete_account_endpoint(State(state), Path(12)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
