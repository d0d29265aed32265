//! The page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::get_all_accounts,
    category::{CategoryTree, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, PageMode, dollar_input_styles, page},
    transaction::{
        TransactionId,
        form::{
            TransactionFormChoices, TransactionFormMode, TransactionFormValues,
            transaction_form_view,
        },
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the transaction form filled with the stored values.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
    mode: PageMode,
) -> Result<Response, Error> {
    let (transaction, accounts, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_transaction(transaction_id, &connection)?.ok_or(Error::NotFound)?;

        (
            transaction,
            get_all_accounts(&connection)?,
            CategoryTree::new(get_all_categories(&connection)?),
        )
    };

    let form = transaction_form_view(
        &TransactionFormMode::Edit {
            endpoint: format_endpoint(endpoints::TRANSACTION, transaction.id),
        },
        &TransactionFormChoices {
            accounts: &accounts,
            categories: &categories,
        },
        &TransactionFormValues {
            posted_on: transaction.posted_on,
            payee: &transaction.payee,
            amount: Some(transaction.amount),
            direction: transaction.direction,
            memo: &transaction.memo,
            account_id: Some(transaction.account_id),
            category_id: transaction.category_id,
            cleared_status: transaction.cleared_status,
        },
        "",
    );

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }
            (form)
        }
    };

    Ok(page(
        "Edit Transaction",
        endpoints::EDIT_TRANSACTION_VIEW,
        &[dollar_input_styles()],
        &content,
        mode,
    )
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        endpoints::{self, format_endpoint},
        html::PageMode,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, must_get_form, parse_html_document,
        },
        transaction::{
            Direction, Transaction, create_transaction, test_utils::must_create_account,
        },
    };

    use super::{EditTransactionPageState, get_edit_transaction_page};

    #[tokio::test]
    async fn form_is_prefilled() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = must_create_account("Everyday", &conn);
        let transaction = create_transaction(
            Transaction::build(dec!(12.5), Direction::Outflow, date!(2025 - 02 - 03), "Cafe", account_id),
            &conn,
        )
        .unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_edit_transaction_page(State(state), Path(transaction.id), PageMode::Full)
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "payee", "text", "Cafe");
        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "posted_on", "date", "2025-02-03");
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let result = get_edit_transaction_page(State(state), Path(9), PageMode::Full).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
