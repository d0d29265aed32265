//! The page for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountId, get_all_accounts},
    category::{CategoryTree, get_all_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, PageMode, dollar_input_styles, link, page},
    timezone::local_today,
    transaction::form::{
        TransactionFormChoices, TransactionFormMode, TransactionFormValues, transaction_form_view,
    },
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Preselects an account in the form.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NewTransactionQuery {
    pub account_id: Option<AccountId>,
}

/// Renders the form for a new transaction dated today.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
    Query(query): Query<NewTransactionQuery>,
    mode: PageMode,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let (accounts, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_all_accounts(&connection)?,
            CategoryTree::new(get_all_categories(&connection)?),
        )
    };

    let form: Markup = if accounts.is_empty() {
        html! {
            p
            {
                "Transactions belong to an account. "
                (link(endpoints::NEW_ACCOUNT_VIEW, "Add an account"))
                " first."
            }
        }
    } else {
        transaction_form_view(
            &TransactionFormMode::Create,
            &TransactionFormChoices {
                accounts: &accounts,
                categories: &categories,
            },
            &TransactionFormValues::new(today, query.account_id),
            "",
        )
    };

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }
            (form)
        }
    };

    Ok(page(
        "New Transaction",
        endpoints::NEW_TRANSACTION_VIEW,
        &[dollar_input_styles()],
        &content,
        mode,
    )
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{CategoryName, UNCATEGORIZED_LABEL, create_category},
        db::initialize,
        endpoints,
        html::PageMode,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::test_utils::must_create_account,
    };

    use super::{CreateTransactionPageState, NewTransactionQuery, get_create_transaction_page};

    #[tokio::test]
    async fn form_offers_uncategorized_and_categories() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        must_create_account("Everyday", &conn);
        let savings = must_create_account("Savings", &conn);
        create_category(CategoryName::new_unchecked("Food"), None, &conn).unwrap();
        let state = CreateTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_create_transaction_page(
            State(state),
            Query(NewTransactionQuery {
                account_id: Some(savings),
            }),
            PageMode::Full,
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "posted_on", "date");
        assert_form_input(&form, "payee", "text");
        assert_form_submit_button(&form);

        let categories: Vec<String> = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(categories, [UNCATEGORIZED_LABEL, "Food"]);

        let selected_account = form
            .select(&Selector::parse("select[name=account_id] option[selected]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(selected_account.trim(), "Savings");
    }

    #[tokio::test]
    async fn no_accounts_links_to_new_account() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = CreateTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response =
            get_create_transaction_page(State(state), Query(NewTransactionQuery::default()), PageMode::Full)
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        assert!(html.select(&Selector::parse("form").unwrap()).next().is_none());
        let link = html
            .select(&Selector::parse("main a, div a").unwrap())
            .any(|a| a.value().attr("href") == Some(endpoints::NEW_ACCOUNT_VIEW));
        assert!(link);
    }
}
