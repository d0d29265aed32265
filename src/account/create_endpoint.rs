//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        NewAccount, OpeningBalance, add_account,
        form::{AccountFormMode, AccountFormValues, CreateAccountForm, account_form_view},
    },
    endpoints,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new account, redirects to accounts view on success.
///
/// An empty name re-renders the form with an error message.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Form(form): Form<CreateAccountForm>,
) -> Response {
    let new_account = match NewAccount::new(&form.name, form.kind, form.budget_kind) {
        Ok(new_account) => new_account,
        Err(error) => {
            let values = AccountFormValues {
                name: &form.name,
                kind: form.kind,
                budget_kind: form.budget_kind,
            };
            return account_form_view(
                &AccountFormMode::Create {
                    max_date: form.date,
                },
                &values,
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

    let opening_balance = OpeningBalance {
        amount: form.balance,
        date: form.date,
    };

    match add_account(new_account, Some(opening_balance), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateAccountName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not create account with {form:?}, got an unexpected error: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        account::{
            AccountKind, BudgetKind, create_endpoint::CreateAccountState, create_account_endpoint,
            form::CreateAccountForm, get_all_accounts,
        },
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    fn get_test_state() -> CreateAccountState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateAccountState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn form(name: &str) -> CreateAccountForm {
        CreateAccountForm {
            name: name.to_owned(),
            kind: AccountKind::Savings,
            budget_kind: BudgetKind::Budget,
            balance: dec!(123.45),
            date: date!(2025 - 05 - 06),
        }
    }

    #[tokio::test]
    async fn can_create_account() {
        let state = get_test_state();

        let response = create_account_endpoint(State(state.clone()), Form(form("Rainy Day"))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let accounts = get_all_accounts(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Rainy Day");
        assert_eq!(accounts[0].kind, AccountKind::Savings);
        assert_eq!(accounts[0].balance, dec!(123.45));
        assert_eq!(accounts[0].balance_date, date!(2025 - 05 - 06));
    }

    #[tokio::test]
    async fn empty_name_shows_form_error() {
        let state = get_test_state();

        let response = create_account_endpoint(State(state.clone()), Form(form("   "))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Account name cannot be empty");
        let accounts = get_all_accounts(&state.db_connection.lock().unwrap()).unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_bad_request() {
        let state = get_test_state();
        create_account_endpoint(State(state.clone()), Form(form("Everyday"))).await;

        let response = create_account_endpoint(State(state), Form(form("Everyday"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
