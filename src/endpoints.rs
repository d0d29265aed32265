//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}/edit', use [format_endpoint].

/// The root route which redirects to the budget page.
pub const ROOT: &str = "/";
/// The budget for one month, the landing page.
pub const BUDGET_VIEW: &str = "/budget";
/// The page listing accounts and their balances.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for creating a new account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for editing an existing account.
pub const EDIT_ACCOUNT_VIEW: &str = "/accounts/{account_id}/edit";
/// The page listing the category tree.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The read only table row for one category.
pub const CATEGORY_VIEW: &str = "/categories/{category_id}";
/// The inline editor for a category's name.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page listing every envelope.
pub const ENVELOPES_VIEW: &str = "/envelopes";
/// The page for creating a new envelope.
pub const NEW_ENVELOPE_VIEW: &str = "/envelopes/new";
/// The page for displaying transactions, optionally for one account with `?account_id=`.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for importing a bank statement.
pub const IMPORT_VIEW: &str = "/transactions/import";
/// The page linking to the spending reports.
pub const REPORTS_VIEW: &str = "/reports";
/// Spending by category for one month.
pub const MONTHLY_SPENDING_VIEW: &str = "/reports/monthly";
/// Spending by category for every month.
pub const ANNUAL_SPENDING_VIEW: &str = "/reports/annual";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to update or delete an account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to rename or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create an envelope.
pub const ENVELOPES_API: &str = "/api/envelopes";
/// The route to delete an envelope.
pub const ENVELOPE: &str = "/api/envelopes/{envelope_id}";
/// The route to view or set the budgeted amount for a month and category.
pub const ENVELOPE_AMOUNT: &str = "/api/envelope_amount";
/// The route to view or set the budgeted amount of a saved envelope.
pub const ENVELOPE_AMOUNT_BY_ID: &str = "/api/envelopes/{envelope_id}/amount";
/// The route to create an envelope for every category in a month.
pub const SEED_BUDGET: &str = "/api/budget/seed";
/// The route to copy one month's envelopes to another month.
pub const COPY_BUDGET: &str = "/api/budget/copy";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to categorize transactions by matching payees.
pub const AUTO_CATEGORIZE: &str = "/api/auto_categorize";
/// The route to upload a bank statement.
pub const IMPORT: &str = "/api/import";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}', '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::BUDGET_VIEW,
            endpoints::ACCOUNTS_VIEW,
            endpoints::NEW_ACCOUNT_VIEW,
            endpoints::EDIT_ACCOUNT_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::CATEGORY_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::ENVELOPES_VIEW,
            endpoints::NEW_ENVELOPE_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::IMPORT_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::MONTHLY_SPENDING_VIEW,
            endpoints::ANNUAL_SPENDING_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::ACCOUNTS_API,
            endpoints::ACCOUNT,
            endpoints::CATEGORIES_API,
            endpoints::CATEGORY,
            endpoints::ENVELOPES_API,
            endpoints::ENVELOPE,
            endpoints::ENVELOPE_AMOUNT,
            endpoints::ENVELOPE_AMOUNT_BY_ID,
            endpoints::SEED_BUDGET,
            endpoints::COPY_BUDGET,
            endpoints::TRANSACTIONS_API,
            endpoints::TRANSACTION,
            endpoints::AUTO_CATEGORIZE,
            endpoints::IMPORT,
        ] {
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 1));
        }
    }

    #[test]
    fn format_endpoint_replaces_parameter() {
        assert_eq!(
            format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, 42),
            "/accounts/42/edit"
        );
    }

    #[test]
    fn format_endpoint_without_parameter_is_unchanged() {
        assert_eq!(
            format_endpoint(endpoints::ACCOUNTS_VIEW, 42),
            endpoints::ACCOUNTS_VIEW
        );
    }
}
