//! The form shared by the create and edit account pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    account::{AccountKind, BudgetKind},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
};

/// The form data for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountForm {
    pub name: String,
    pub kind: AccountKind,
    pub budget_kind: BudgetKind,
    /// The opening balance in dollars, negative for money owed.
    pub balance: Decimal,
    /// The date of the opening balance.
    pub date: Date,
}

/// The form data for editing an account.
#[derive(Debug, Deserialize)]
pub struct EditAccountForm {
    pub name: String,
    pub kind: AccountKind,
    pub budget_kind: BudgetKind,
}

/// Where the form is sent and what the opening balance fields should show.
pub enum AccountFormMode {
    Create { max_date: Date },
    Edit { endpoint: String },
}

/// The values shown in the account form's inputs.
pub struct AccountFormValues<'a> {
    pub name: &'a str,
    pub kind: AccountKind,
    pub budget_kind: BudgetKind,
}

impl Default for AccountFormValues<'_> {
    fn default() -> Self {
        Self {
            name: "",
            kind: AccountKind::Checking,
            budget_kind: BudgetKind::Budget,
        }
    }
}

pub fn account_form_view(
    mode: &AccountFormMode,
    values: &AccountFormValues,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, button_text) = match mode {
        AccountFormMode::Create { .. } => {
            (Some(crate::endpoints::ACCOUNTS_API), None, "Create Account")
        }
        AccountFormMode::Edit { endpoint } => (None, Some(endpoint.as_str()), "Save Changes"),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Account Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Everyday Account"
                    value=(values.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Account Type" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in AccountKind::ALL {
                        option value=(kind.as_str()) selected[kind == values.kind] { (kind.label()) }
                    }
                }
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Budget" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for kind in BudgetKind::ALL {
                        @let id = format!("budget-kind-{}", kind.as_str());

                        div class="flex flex-1 items-center gap-2"
                        {
                            input
                                id=(id)
                                type="radio"
                                name="budget_kind"
                                value=(kind.as_str())
                                checked[kind == values.budget_kind]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
                        }
                    }
                }
            }

            @if let AccountFormMode::Create { max_date } = mode {
                div
                {
                    label for="balance" class=(FORM_LABEL_STYLE) { "Opening Balance" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="balance"
                            type="number"
                            name="balance"
                            step="0.01"
                            value="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Balance Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(max_date)
                        max=(max_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (button_text) }
        }
    }
}
