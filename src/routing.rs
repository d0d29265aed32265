//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_accounts_page, get_create_account_page, get_edit_account_page,
    },
    budget::get_budget_page,
    categorize::auto_categorize_endpoint,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_category_edit_row, get_category_row, rename_category_endpoint,
    },
    endpoints,
    envelope::{
        copy_budget_endpoint, create_envelope_endpoint, delete_envelope_endpoint,
        get_create_envelope_page, get_envelope_amount_editor, get_envelope_amount_editor_by_id,
        get_envelopes_page, seed_budget_endpoint, update_envelope_amount_by_id_endpoint,
        update_envelope_amount_endpoint,
    },
    import::{get_import_page, import_statement_endpoint},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{get_annual_spending_page, get_monthly_spending_page, get_reports_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_create_transaction_page, get_edit_transaction_page, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::BUDGET_VIEW, get(get_budget_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_create_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::CATEGORY_VIEW, get(get_category_row))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_category_edit_row))
        .route(endpoints::ENVELOPES_VIEW, get(get_envelopes_page))
        .route(endpoints::NEW_ENVELOPE_VIEW, get(get_create_envelope_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(
            endpoints::MONTHLY_SPENDING_VIEW,
            get(get_monthly_spending_page),
        )
        .route(
            endpoints::ANNUAL_SPENDING_VIEW,
            get(get_annual_spending_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api = Router::new()
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(
            endpoints::ACCOUNT,
            axum::routing::put(edit_account_endpoint).delete(delete_account_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            axum::routing::patch(rename_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::ENVELOPES_API, post(create_envelope_endpoint))
        .route(
            endpoints::ENVELOPE,
            axum::routing::delete(delete_envelope_endpoint),
        )
        .route(
            endpoints::ENVELOPE_AMOUNT,
            get(get_envelope_amount_editor).patch(update_envelope_amount_endpoint),
        )
        .route(
            endpoints::ENVELOPE_AMOUNT_BY_ID,
            get(get_envelope_amount_editor_by_id).patch(update_envelope_amount_by_id_endpoint),
        )
        .route(endpoints::SEED_BUDGET, post(seed_budget_endpoint))
        .route(endpoints::COPY_BUDGET, post(copy_budget_endpoint))
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            axum::routing::put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::AUTO_CATEGORIZE, post(auto_categorize_endpoint))
        .route(endpoints::IMPORT, post(import_statement_endpoint));

    pages
        .merge(api)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the budget page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::BUDGET_VIEW)
}
