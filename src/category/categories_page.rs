//! The page listing the category tree with a form for adding categories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryTree, get_all_categories, inline_edit::category_row_view},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        PageMode, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, page,
    },
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?
    };

    let tree = CategoryTree::new(categories);

    Ok(page(
        "Categories",
        endpoints::CATEGORIES_VIEW,
        &[],
        &categories_view(&tree),
        mode,
    )
    .into_response())
}

/// The form for adding a category, with the roots offered as parents.
pub fn new_category_form_view(roots: &[Category], error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Groceries"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="parent_id" class=(FORM_LABEL_STYLE) { "Parent Category" }

                select id="parent_id" name="parent_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "None (top level)" }

                    @for root in roots {
                        option value=(root.id) { (root.name) }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

fn categories_view(tree: &CategoryTree) -> Markup {
    html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-3xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Categories" }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in tree.rows() {
                                (category_row_view(row.category))
                            }

                            @if tree.is_empty() {
                                tr
                                {
                                    td colspan="2" class="px-6 py-4 text-center"
                                    {
                                        "No categories yet. Add one below."
                                    }
                                }
                            }
                        }
                    }
                }

                section class="max-w-md"
                {
                    h2 class="text-lg font-semibold mb-2" { "New Category" }
                    (new_category_form_view(tree.roots(), ""))
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{
            CategoryName, categories_page::CategoriesPageState, create_category,
            get_categories_page,
        },
        db::initialize,
        endpoints,
        html::PageMode,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    #[tokio::test]
    async fn lists_categories_in_tree_order() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let bills = create_category(CategoryName::new_unchecked("Bills"), None, &connection).unwrap();
        create_category(CategoryName::new_unchecked("Food"), None, &connection).unwrap();
        create_category(
            CategoryName::new_unchecked("Power"),
            Some(bills.id),
            &connection,
        )
        .unwrap();
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state), PageMode::Full)
            .await
            .expect("could not render page");

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let names: Vec<String> = html
            .select(&Selector::parse("tbody tr [data-category-name]").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();
        assert_eq!(names, ["Bills", "Power", "Food"]);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CATEGORIES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        let parent_options = form
            .select(&Selector::parse("select[name=parent_id] option").unwrap())
            .count();
        assert_eq!(parent_options, 3, "want the empty option plus two roots");
    }
}
