//! Envelopes: the amount budgeted for a category in a month.

mod amount_editor;
mod budget_actions;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod envelopes_page;
mod form;

pub use amount_editor::{
    ENVELOPE_UPDATED_EVENT, envelope_amount_view, get_envelope_amount_editor,
    get_envelope_amount_editor_by_id, update_envelope_amount_by_id_endpoint,
    update_envelope_amount_endpoint,
};
pub use budget_actions::{copy_budget_endpoint, seed_budget_endpoint};
pub use core::{
    Envelope, EnvelopeActivity, EnvelopeId, EnvelopeKey, copy_envelopes, create_envelope,
    create_envelope_table, create_envelopes_for_all_categories, delete_envelope,
    get_all_envelopes_with_outflow, get_envelope, get_envelope_by_key, get_envelopes_for_month,
    get_outflow_by_category, update_envelope_amount,
};
pub use create_endpoint::create_envelope_endpoint;
pub use create_page::get_create_envelope_page;
pub use delete_endpoint::delete_envelope_endpoint;
pub use envelopes_page::get_envelopes_page;
