//! Table row fragments for viewing and renaming a category in place.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryId, CategoryName, domain::RenameCategoryFormData, get_category,
        rename_category,
    },
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_ROW_STYLE},
};

/// The state needed for the inline category editor.
#[derive(Debug, Clone)]
pub struct CategoryRowState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryRowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The read only table row for a category.
pub fn category_row_view(category: &Category) -> Markup {
    let name_style = if category.is_root() {
        "px-6 py-4 font-semibold text-gray-900 dark:text-white"
    } else {
        "py-4 pl-12 pr-6"
    };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(name_style) data-category-name="true" { (category.name) }

            td class="px-6 py-4"
            {
                div class="flex gap-4"
                {
                    button
                        type="button"
                        hx-get=(format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id))
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        class=(LINK_STYLE)
                    {
                        "Rename"
                    }

                    button
                        type="button"
                        hx-delete=(format_endpoint(endpoints::CATEGORY, category.id))
                        hx-confirm={
                            "Delete the category '" (category.name) "'? "
                            "Its transactions will become uncategorized."
                        }
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn category_edit_row_view(category: &Category) -> Markup {
    let input_id = format!("category-name-{}", category.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class="px-6 py-2"
            {
                label for=(input_id) class="sr-only" { "Category name" }

                input
                    id=(input_id)
                    type="text"
                    name="name"
                    value=(category.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            td class="px-6 py-2"
            {
                div class="flex gap-4"
                {
                    button
                        type="button"
                        hx-patch=(format_endpoint(endpoints::CATEGORY, category.id))
                        hx-include="closest tr"
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="outerHTML"
                        class=(LINK_STYLE)
                    {
                        "Save"
                    }

                    button
                        type="button"
                        hx-get=(format_endpoint(endpoints::CATEGORY_VIEW, category.id))
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        class=(LINK_STYLE)
                    {
                        "Cancel"
                    }
                }
            }
        }
    )
}

fn lock_and_get_category(
    state: &CategoryRowState,
    category_id: CategoryId,
) -> Result<Category, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_category(category_id, &connection)?.ok_or(Error::NotFound)
}

/// Returns the read only row for a category, used to cancel an edit.
pub async fn get_category_row(
    State(state): State<CategoryRowState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    match lock_and_get_category(&state, category_id) {
        Ok(category) => category_row_view(&category).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Returns the row with a text input for renaming the category.
pub async fn get_category_edit_row(
    State(state): State<CategoryRowState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    match lock_and_get_category(&state, category_id) {
        Ok(category) => category_edit_row_view(&category).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Renames a category and returns its read only row.
pub async fn rename_category_endpoint(
    State(state): State<CategoryRowState>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<RenameCategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = rename_category(category_id, name, &connection) {
        if error != Error::UpdateMissingCategory {
            tracing::error!("could not rename category {category_id}: {error}");
        }
        return error.into_alert_response();
    }

    match get_category(category_id, &connection) {
        Ok(Some(category)) => category_row_view(&category).into_response(),
        Ok(None) => Error::NotFound.into_alert_response(),
        Err(error) => error.into_alert_response(),
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
    use scraper::Selector;

    use crate::{
        category::{
            Category, CategoryName, create_category, domain::RenameCategoryFormData, get_category,
            inline_edit::{
                CategoryRowState, get_category_edit_row, get_category_row,
                rename_category_endpoint,
            },
        },
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::parse_table_rows,
    };

    fn state_with_category(name: &str) -> (CategoryRowState, Category) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let category =
            create_category(CategoryName::new_unchecked(name), None, &connection).unwrap();

        (
            CategoryRowState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            category,
        )
    }

    #[tokio::test]
    async fn edit_row_has_name_input_and_patch_button() {
        let (state, category) = state_with_category("Fun");

        let response = get_category_edit_row(State(state), Path(category.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_table_rows(response).await;
        let input = html
            .select(&Selector::parse("input[name=name]").unwrap())
            .next()
            .expect("no name input");
        assert_eq!(input.value().attr("value"), Some("Fun"));
        let save = html
            .select(&Selector::parse("button[hx-patch]").unwrap())
            .next()
            .expect("no save button");
        assert_eq!(
            save.value().attr("hx-patch"),
            Some(format_endpoint(endpoints::CATEGORY, category.id).as_str())
        );
    }

    #[tokio::test]
    async fn rename_returns_read_only_row() {
        let (state, category) = state_with_category("Fun");

        let response = rename_category_endpoint(
            State(state.clone()),
            Path(category.id),
            Form(RenameCategoryFormData {
                name: "Entertainment".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_table_rows(response).await;
        let name = html
            .select(&Selector::parse("[data-category-name]").unwrap())
            .next()
            .expect("no name cell")
            .text()
            .collect::<String>();
        assert_eq!(name.trim(), "Entertainment");
        let stored = get_category(category.id, &state.db_connection.lock().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, CategoryName::new_unchecked("Entertainment"));
    }

    #[tokio::test]
    async fn rename_rejects_empty_name() {
        let (state, category) = state_with_category("Fun");

        let response = rename_category_endpoint(
            State(state),
            Path(category.id),
            Form(RenameCategoryFormData {
                name: " ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_category_row_is_not_found() {
        let (state, _) = state_with_category("Fun");

        let response = get_category_row(State(state), Path(404)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
