//! The page and endpoint for importing a bank statement into an account.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PageMode, link, loading_spinner, page,
    },
    import::statement::{StatementRecord, parse_statement},
    transaction::create_transaction,
};

/// The state needed for importing bank statements.
#[derive(Debug, Clone)]
pub struct ImportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn import_form_view(accounts: &[Account]) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::IMPORT)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #submit-button"
            hx-indicator="#indicator"
            hx-target="#alert-container"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                select id="account_id" name="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for account in accounts {
                        option value=(account.id) { (account.name) }
                    }
                }
            }

            div
            {
                label for="file" class=(FORM_LABEL_STYLE) { "Bank statement" }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept="application/json,.json"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-1 text-sm"
                {
                    "Export the account's transactions from online banking as JSON. "
                    "Every line of the statement is added as a cleared transaction."
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Import"
            }
        }
    }
}

/// Route handler for the import page.
pub async fn get_import_page(
    State(state): State<ImportState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let accounts = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_accounts(&connection)?
    };

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Import Transactions" }

            @if accounts.is_empty() {
                p
                {
                    "Statements are imported into an account. "
                    (link(endpoints::NEW_ACCOUNT_VIEW, "Add an account"))
                    " first."
                }
            } @else {
                (import_form_view(&accounts))
            }
        }
    };

    Ok(page(
        "Import Transactions",
        endpoints::IMPORT_VIEW,
        &[],
        &content,
        mode,
    )
    .into_response())
}

struct StatementUpload {
    account_id: AccountId,
    file: Vec<u8>,
}

async fn read_field_bytes(field: Field<'_>) -> Result<Vec<u8>, Error> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|error| {
            tracing::error!("Could not read data from multipart form field: {error}");
            Error::MultipartError("Could not read data from multipart form field.".to_owned())
        })
}

async fn read_upload(mut multipart: Multipart) -> Result<StatementUpload, Error> {
    let mut account_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?
    {
        match field.name() {
            Some("account_id") => {
                let text = String::from_utf8_lossy(&read_field_bytes(field).await?).into_owned();
                let id = text.trim().parse::<AccountId>().map_err(|_| {
                    Error::MultipartError(format!("\"{text}\" is not an account ID"))
                })?;
                account_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = read_field_bytes(field).await?;
                tracing::debug!("Received file '{file_name}' that is {} bytes", data.len());
                file = Some(data);
            }
            name => tracing::debug!("ignoring unexpected multipart field {name:?}"),
        }
    }

    let file = file
        .filter(|data| !data.iter().all(u8::is_ascii_whitespace))
        .ok_or(Error::EmptyUpload)?;
    let account_id = account_id
        .ok_or_else(|| Error::MultipartError("Choose an account to import into.".to_owned()))?;

    Ok(StatementUpload { account_id, file })
}

/// Insert every record as a ledger entry, all or nothing.
fn import_records(
    records: &[StatementRecord],
    account_id: AccountId,
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    for record in records {
        create_transaction(record.to_builder(account_id), &sql_transaction)?;
    }

    sql_transaction.commit()?;

    Ok(records.len())
}

/// Route handler for importing a bank statement upload.
///
/// The form carries an `account_id` and the statement as `file`.
pub async fn import_statement_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Response {
    let start_time = Instant::now();

    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(error) => return error.into_alert_response(),
    };

    let records = match parse_statement(&upload.file) {
        Ok(records) => records,
        Err(error) => {
            tracing::debug!("Failed to parse bank statement: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match import_records(&records, upload.account_id, &connection) {
        Ok(count) => {
            let duration = start_time.elapsed();
            tracing::info!(
                "Imported {count} transactions into account {} in {}ms",
                upload.account_id,
                duration.as_millis()
            );

            (
                StatusCode::CREATED,
                Alert::Success {
                    message: "Import completed successfully!".to_owned(),
                    details: format!(
                        "Imported {count} transactions in {}ms.",
                        duration.as_millis()
                    ),
                }
                .into_html(),
            )
                .into_response()
        }
        Err(error @ Error::InvalidForeignKey) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Failed to import transactions: {error}");
            error.into_alert_response()
        }
    }
}
