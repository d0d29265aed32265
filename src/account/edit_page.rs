//! Defines the route handler for the page for editing an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        AccountId,
        form::{AccountFormMode, AccountFormValues, account_form_view},
        get_account,
    },
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, PageMode, page},
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing an account's name and kinds.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Path(account_id): Path<AccountId>,
    mode: PageMode,
) -> Result<Response, Error> {
    let account = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_account(account_id, &connection)?.ok_or(Error::NotFound)?
    };

    let form = account_form_view(
        &AccountFormMode::Edit {
            endpoint: format_endpoint(endpoints::ACCOUNT, account.id),
        },
        &AccountFormValues {
            name: &account.name,
            kind: account.kind,
            budget_kind: account.budget_kind,
        },
        "",
    );

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit " (account.name) }
            (form)
        }
    };

    Ok(page(
        "Edit Account",
        endpoints::EDIT_ACCOUNT_VIEW,
        &[],
        &content,
        mode,
    )
    .into_response())
}
