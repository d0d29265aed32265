//! Defines the endpoint for creating a new category.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        CategoryFormData, CategoryName, CategoryTree, categories_page::new_category_form_view,
        create_category, get_all_categories,
    },
    endpoints,
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new category, redirects to the categories view on success.
///
/// An empty name re-renders the form with an error message.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            let roots = match get_all_categories(&connection) {
                Ok(categories) => CategoryTree::new(categories),
                Err(error) => return error.into_alert_response(),
            };

            return new_category_form_view(roots.roots(), &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_category(name, form.parent_id, &connection) {
        Ok(category) => {
            tracing::debug!("created category {} ({})", category.name, category.id);
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::InvalidParentCategory(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create category with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
