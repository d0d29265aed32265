//! Defines the endpoint for updating an account's name and kinds.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        AccountId, NewAccount,
        form::{AccountFormMode, AccountFormValues, EditAccountForm, account_form_view},
        update_account,
    },
    endpoints::{self, format_endpoint},
};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating an account, redirects to accounts view on success.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<EditAccountForm>,
) -> Response {
    let new_account = match NewAccount::new(&form.name, form.kind, form.budget_kind) {
        Ok(new_account) => new_account,
        Err(error) => {
            return account_form_view(
                &AccountFormMode::Edit {
                    endpoint: format_endpoint(endpoints::ACCOUNT, account_id),
                },
                &AccountFormValues {
                    name: &form.name,
                    kind: form.kind,
                    budget_kind: form.budget_kind,
                },
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(account_id, new_account, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingAccount | Error::DuplicateAccountName(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        account::{
            AccountKind, BudgetKind, NewAccount, add_account, edit_account_endpoint,
            edit_endpoint::EditAccountState, form::EditAccountForm, get_account,
        },
        db::initialize,
        endpoints,
        test_utils::assert_hx_redirect,
    };

    fn get_test_state() -> EditAccountState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        EditAccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn can_update_account() {
        let state = get_test_state();
        let account = add_account(
            NewAccount::new_unchecked("Old", AccountKind::Checking, BudgetKind::Budget),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = EditAccountForm {
            name: "New".to_owned(),
            kind: AccountKind::Cash,
            budget_kind: BudgetKind::OffBudget,
        };

        let response =
            edit_account_endpoint(State(state.clone()), Path(account.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let got = get_account(account.id, &state.db_connection.lock().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(got.name, "New");
        assert_eq!(got.kind, AccountKind::Cash);
        assert_eq!(got.budget_kind, BudgetKind::OffBudget);
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let state = get_test_state();
        let form = EditAccountForm {
            name: "Ghost".to_owned(),
            kind: AccountKind::Cash,
            budget_kind: BudgetKind::Budget,
        };

        let response = edit_account_endpoint(State(state), Path(99), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
