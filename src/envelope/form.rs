//! The form for creating an envelope.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    category::{CategoryId, CategoryTree},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating an envelope.
///
/// The month is kept as text so that a malformed month can be shown back to the user.
#[derive(Debug, Deserialize)]
pub struct CreateEnvelopeForm {
    pub month: String,
    pub budgeted: Decimal,
    /// Empty for a general envelope with no category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

pub struct EnvelopeFormValues<'a> {
    pub month: &'a str,
    pub budgeted: Decimal,
    pub category_id: Option<CategoryId>,
}

pub fn envelope_form_view(
    tree: &CategoryTree,
    values: &EnvelopeFormValues,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::ENVELOPES_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                input
                    id="month"
                    type="month"
                    name="month"
                    value=(values.month)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.category_id.is_none()] { "General (no category)" }

                    @for row in tree.rows() {
                        option
                            value=(row.category.id)
                            selected[values.category_id == Some(row.category.id)]
                        {
                            (tree.label(Some(row.category.id)))
                        }
                    }
                }
            }

            div
            {
                label for="budgeted" class=(FORM_LABEL_STYLE) { "Budgeted" }

                div class="input-wrapper w-full"
                {
                    input
                        id="budgeted"
                        type="number"
                        name="budgeted"
                        step="0.01"
                        min="0"
                        value=(values.budgeted)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Envelope" }
        }
    }
}
