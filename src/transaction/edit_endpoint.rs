//! Defines the endpoint for replacing a transaction's fields.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    transaction::{
        TransactionId,
        form::{TransactionForm, TransactionFormMode, transaction_form_error_response},
        update_transaction,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction, redirects to the account's ledger on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, form.to_builder(), &connection) {
        Ok(()) => (
            HxRedirect(format!(
                "{}?account_id={}",
                endpoints::TRANSACTIONS_VIEW,
                form.account_id
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::NegativeAmount) => transaction_form_error_response(
            &TransactionFormMode::Edit {
                endpoint: format_endpoint(endpoints::TRANSACTION, transaction_id),
            },
            &form,
            &error,
            &connection,
        ),
        Err(error @ (Error::UpdateMissingTransaction | Error::InvalidForeignKey)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
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
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, must_get_form,
            parse_html_fragment,
        },
        transaction::{
            ClearedStatus, Direction, Transaction, create_transaction, form::TransactionForm,
            get_transaction, test_utils::must_create_account,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    #[tokio::test]
    async fn replaces_every_field() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = must_create_account("Everyday", &conn);
        let category = create_category(CategoryName::new_unchecked("Food"), None, &conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(dec!(5), Direction::Outflow, date!(2025 - 01 - 01), "Old", account_id),
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let form = TransactionForm {
            posted_on: date!(2025 - 01 - 09),
            payee: "New".to_owned(),
            amount: dec!(9.99),
            direction: Direction::Inflow,
            memo: "refund".to_owned(),
            account_id,
            category_id: Some(category.id),
            cleared_status: ClearedStatus::Cleared,
        };

        let response =
            edit_transaction_endpoint(State(state.clone()), Path(transaction.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(
            &response,
            &format!("{}?account_id={account_id}", endpoints::TRANSACTIONS_VIEW),
        );
        let got = get_transaction(transaction.id, &state.db_connection.lock().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(got.payee, "New");
        assert_eq!(got.amount, dec!(9.99));
        assert_eq!(got.direction, Direction::Inflow);
        assert_eq!(got.memo, "refund");
        assert_eq!(got.category_id, Some(category.id));
        assert_eq!(got.cleared_status, ClearedStatus::Cleared);
    }

    #[tokio::test]
    async fn negative_amount_is_shown_on_edit_form() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = must_create_account("Everyday", &conn);
        let transaction = create_transaction(
            Transaction::build(dec!(5), Direction::Outflow, date!(2025 - 01 - 01), "Old", account_id),
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let form = TransactionForm {
            posted_on: date!(2025 - 01 - 01),
            payee: "Old".to_owned(),
            amount: dec!(-5),
            direction: Direction::Outflow,
            memo: String::new(),
            account_id,
            category_id: None,
            cleared_status: ClearedStatus::Uncleared,
        };

        let response =
            edit_transaction_endpoint(State(state), Path(transaction.id), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_error_message(&form, "Error: amounts cannot be negative");
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = must_create_account("Everyday", &conn);
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let form = TransactionForm {
            posted_on: date!(2025 - 01 - 01),
            payee: "Ghost".to_owned(),
            amount: dec!(1),
            direction: Direction::Outflow,
            memo: String::new(),
            account_id,
            category_id: None,
            cleared_status: ClearedStatus::Uncleared,
        };

        let response = edit_transaction_endpoint(State(state), Path(77), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
