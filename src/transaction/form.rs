//! The form shared by the new and edit transaction pages.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::{Account, AccountId, get_all_accounts},
    category::{CategoryId, CategoryTree, UNCATEGORIZED_LABEL, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    transaction::{ClearedStatus, Direction, Transaction, TransactionBuilder},
};

/// The form data for creating or replacing a transaction.
///
/// An empty `category_id` means uncategorized, so this must be extracted with
/// `axum_extra::extract::Form`.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub posted_on: Date,
    pub payee: String,
    pub amount: Decimal,
    pub direction: Direction,
    #[serde(default)]
    pub memo: String,
    pub account_id: AccountId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub cleared_status: ClearedStatus,
}

impl TransactionForm {
    pub fn to_builder(&self) -> TransactionBuilder {
        Transaction::build(
            self.amount,
            self.direction,
            self.posted_on,
            self.payee.trim(),
            self.account_id,
        )
        .memo(&self.memo)
        .category_id(self.category_id)
        .cleared_status(self.cleared_status)
    }

    pub fn values(&self) -> TransactionFormValues<'_> {
        TransactionFormValues {
            posted_on: self.posted_on,
            payee: &self.payee,
            amount: Some(self.amount),
            direction: self.direction,
            memo: &self.memo,
            account_id: Some(self.account_id),
            category_id: self.category_id,
            cleared_status: self.cleared_status,
        }
    }
}

/// Where the form is sent.
pub enum TransactionFormMode {
    Create,
    Edit { endpoint: String },
}

/// The values shown in the transaction form's inputs.
pub struct TransactionFormValues<'a> {
    pub posted_on: Date,
    pub payee: &'a str,
    pub amount: Option<Decimal>,
    pub direction: Direction,
    pub memo: &'a str,
    pub account_id: Option<AccountId>,
    pub category_id: Option<CategoryId>,
    pub cleared_status: ClearedStatus,
}

impl TransactionFormValues<'_> {
    /// Blank values for a new outflow dated `posted_on`.
    pub fn new(posted_on: Date, account_id: Option<AccountId>) -> Self {
        Self {
            posted_on,
            payee: "",
            amount: None,
            direction: Direction::Outflow,
            memo: "",
            account_id,
            category_id: None,
            cleared_status: ClearedStatus::Uncleared,
        }
    }
}

/// The options a transaction can be filed under.
pub struct TransactionFormChoices<'a> {
    pub accounts: &'a [Account],
    pub categories: &'a CategoryTree,
}

pub fn transaction_form_view(
    mode: &TransactionFormMode,
    choices: &TransactionFormChoices,
    values: &TransactionFormValues,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, button_text) = match mode {
        TransactionFormMode::Create => (Some(endpoints::TRANSACTIONS_API), None, "Add Transaction"),
        TransactionFormMode::Edit { endpoint } => (None, Some(endpoint.as_str()), "Save Changes"),
    };
    let amount = values.amount.map(|amount| format!("{amount:.2}"));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Direction" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for direction in Direction::ALL {
                        @let id = format!("direction-{}", direction.as_str());

                        div class="flex flex-1 items-center gap-2"
                        {
                            input
                                id=(id)
                                type="radio"
                                name="direction"
                                value=(direction.as_str())
                                checked[direction == values.direction]
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (direction.as_str()) }
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        value=[amount]
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="posted_on" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="posted_on"
                    type="date"
                    name="posted_on"
                    value=(values.posted_on)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="payee" class=(FORM_LABEL_STYLE) { "Payee" }

                input
                    id="payee"
                    type="text"
                    name="payee"
                    placeholder="Countdown"
                    value=(values.payee)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                select id="account_id" name="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for account in choices.accounts {
                        option value=(account.id) selected[Some(account.id) == values.account_id]
                        {
                            (account.name)
                        }
                    }
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.category_id.is_none()] { (UNCATEGORIZED_LABEL) }

                    @for row in choices.categories.rows() {
                        option
                            value=(row.category.id)
                            selected[Some(row.category.id) == values.category_id]
                        {
                            (choices.categories.label(Some(row.category.id)))
                        }
                    }
                }
            }

            div
            {
                label for="memo" class=(FORM_LABEL_STYLE) { "Memo" }

                input
                    id="memo"
                    type="text"
                    name="memo"
                    value=(values.memo)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Status" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for status in ClearedStatus::ALL {
                        @let id = format!("cleared-status-{}", status.as_str());

                        div class="flex flex-1 items-center gap-2"
                        {
                            input
                                id=(id)
                                type="radio"
                                name="cleared_status"
                                value=(status.as_str())
                                checked[status == values.cleared_status]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (status.as_str()) }
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (button_text) }
        }
    }
}

/// Re-renders the submitted form with `error` shown under the inputs.
pub fn transaction_form_error_response(
    mode: &TransactionFormMode,
    form: &TransactionForm,
    error: &Error,
    connection: &Connection,
) -> Response {
    let choices = get_all_accounts(connection).and_then(|accounts| {
        get_all_categories(connection).map(|categories| (accounts, CategoryTree::new(categories)))
    });

    match choices {
        Ok((accounts, categories)) => transaction_form_view(
            mode,
            &TransactionFormChoices {
                accounts: &accounts,
                categories: &categories,
            },
            &form.values(),
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not load the transaction form choices: {error}");
            error.into_alert_response()
        }
    }
}
