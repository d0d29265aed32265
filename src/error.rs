//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create an account name.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The parent of a new category does not exist or is itself a subcategory.
    ///
    /// Categories form a two-level tree, so a parent must always be a root category.
    #[error("category {0} cannot be used as a parent category")]
    InvalidParentCategory(CategoryId),

    /// Tried to delete a root category that still has subcategories.
    #[error("the category still has subcategories")]
    CategoryHasChildren,

    /// A negative amount was given for a ledger entry or envelope.
    ///
    /// Ledger entries encode the sign of an amount with their direction.
    #[error("amounts cannot be negative")]
    NegativeAmount,

    /// A month string was not in the form `YYYY-MM`.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// The specified account name already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// An envelope already exists for the month and category.
    #[error("an envelope already exists for that month and category")]
    DuplicateEnvelope,

    /// A query referenced a row that does not exist, e.g. an unknown account ID.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The upload did not contain a file, or the file was empty.
    #[error("no file was uploaded")]
    EmptyUpload,

    /// The bank statement could not be parsed.
    #[error("Could not parse the bank statement: {0}")]
    InvalidImport(String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// A bulk import named a table that is not part of the schema.
    #[error("\"{0}\" is not a table that can be imported into")]
    UnknownTable(String),

    /// A bulk import header named a column the table does not have.
    #[error("the table \"{table}\" has no column \"{column}\"")]
    UnknownColumn {
        /// The table being imported into.
        table: String,
        /// The offending header.
        column: String,
    },

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update an envelope that does not exist
    #[error("tried to update an envelope that is not in the database")]
    UpdateMissingEnvelope,

    /// Tried to delete an envelope that does not exist
    #[error("tried to delete an envelope that is not in the database")]
    DeleteMissingEnvelope,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("envelope.month") =>
            {
                Error::DuplicateEnvelope
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month".to_owned(),
                    details: format!("\"{month}\" is not a month. Use the format YYYY-MM."),
                }
                .into_html(),
            )
                .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::EmptyAccountName | Error::EmptyCategoryName => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: self.to_string(),
                },
            ),
            Error::NegativeAmount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: "Amounts cannot be negative. Use the direction to record money \
                        leaving an account."
                        .to_owned(),
                },
            ),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month".to_owned(),
                    details: format!("\"{month}\" is not a month. Use the format YYYY-MM."),
                },
            ),
            Error::InvalidParentCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid parent category".to_owned(),
                    details: format!(
                        "Category {category_id} does not exist or is already a subcategory. \
                        Subcategories must belong to a top level category."
                    ),
                },
            ),
            Error::CategoryHasChildren => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "Delete or move its subcategories first.".to_owned(),
                },
            ),
            Error::DuplicateAccountName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Account Name".to_owned(),
                    details: format!(
                        "The account {name} already exists in the database. \
                        Choose a different account name, or edit or delete the existing account.",
                    ),
                },
            ),
            Error::DuplicateEnvelope => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate envelope".to_owned(),
                    details: "An envelope already exists for that month and category. \
                        Edit the existing envelope instead."
                        .to_owned(),
                },
            ),
            Error::InvalidForeignKey => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid reference".to_owned(),
                    details: "The selected account or category no longer exists. \
                        Try refreshing the page."
                        .to_owned(),
                },
            ),
            Error::EmptyUpload => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Choose a bank statement to upload.".to_owned(),
                },
            ),
            Error::InvalidImport(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the bank statement".to_owned(),
                    details: reason,
                },
            ),
            Error::MultipartError(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the upload".to_owned(),
                    details: reason,
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "The requested item could not be found.".to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update account".to_owned(),
                    details: "The account could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete account".to_owned(),
                    details: "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update category".to_owned(),
                    details: "The category could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingEnvelope => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update envelope".to_owned(),
                    details: "The envelope could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingEnvelope => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete envelope".to_owned(),
                    details: "The envelope could not be found. \
                    Try refreshing the page to see if the envelope has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
