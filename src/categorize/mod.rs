//! Fills in missing categories from the categories of entries with the same payee.

mod core;
mod endpoint;

pub use core::auto_categorize;
pub use endpoint::auto_categorize_endpoint;
