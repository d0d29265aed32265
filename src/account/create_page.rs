//! Defines the route handler for the page for creating an account.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    account::form::{AccountFormMode, AccountFormValues, account_form_view},
    endpoints,
    html::{FORM_CONTAINER_STYLE, PageMode, dollar_input_styles, page},
    timezone::local_today,
};

/// The state needed for the create account page.
#[derive(Debug, Clone)]
pub struct CreateAccountPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating an account.
pub async fn get_create_account_page(
    State(state): State<CreateAccountPageState>,
    mode: PageMode,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let form = account_form_view(
        &AccountFormMode::Create { max_date: today },
        &AccountFormValues::default(),
        "",
    );

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Account" }
            (form)
        }
    };

    Ok(page(
        "Create Account",
        endpoints::NEW_ACCOUNT_VIEW,
        &[dollar_input_styles()],
        &content,
        mode,
    )
    .into_response())
}
