//! Endpoints that fill in a whole month of envelopes at once.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    envelope::{copy_envelopes, create_envelopes_for_all_categories},
    month::YearMonth,
};

/// The form data for giving every category an envelope in a month.
#[derive(Debug, Deserialize)]
pub struct SeedBudgetForm {
    pub month: YearMonth,
    pub amount: Decimal,
}

/// The form data for copying one month's envelopes into another.
#[derive(Debug, Deserialize)]
pub struct CopyBudgetForm {
    pub source_month: YearMonth,
    pub target_month: YearMonth,
}

/// The state needed to seed or copy a month's envelopes.
#[derive(Debug, Clone)]
pub struct BudgetActionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetActionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn redirect_to_budget(month: YearMonth) -> Response {
    (
        HxRedirect(format!("{}?month={month}", endpoints::BUDGET_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Creates an envelope for every category in the month, then redirects to that month's budget.
pub async fn seed_budget_endpoint(
    State(state): State<BudgetActionState>,
    Form(form): Form<SeedBudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_envelopes_for_all_categories(form.month, form.amount, &connection) {
        Ok(envelopes) => {
            tracing::info!("seeded {} envelopes for {}", envelopes.len(), form.month);
            redirect_to_budget(form.month)
        }
        Err(error @ Error::NegativeAmount) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not seed budget with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// Copies the envelopes of one month into another, then redirects to the target month's budget.
pub async fn copy_budget_endpoint(
    State(state): State<BudgetActionState>,
    Form(form): Form<CopyBudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match copy_envelopes(form.source_month, form.target_month, &connection) {
        Ok(count) => {
            tracing::info!(
                "copied {count} envelopes from {} to {}",
                form.source_month,
                form.target_month
            );
            redirect_to_budget(form.target_month)
        }
        Err(error) => {
            tracing::error!("could not copy budget with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
